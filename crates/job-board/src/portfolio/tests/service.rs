use super::common::*;

use crate::access::DenialReason;
use crate::board::{BoardError, RepositoryError};
use crate::portfolio::{PortfolioRepository, ProjectChanges, TagId};

#[test]
fn public_listing_hides_private_projects() {
    let (service, _) = build_portfolio();
    let owner = seeker(1);
    let shown = publish(&service, &owner, "Ledger", true);
    publish(&service, &owner, "Scratchpad", false);

    let listed = service.list_projects(None).expect("anyone may browse");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, shown.id);

    let mine = service.my_projects(Some(&owner)).expect("owner listing");
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].title, "Scratchpad", "newest first");

    match service.my_projects(None) {
        Err(BoardError::NotAuthenticated) => {}
        other => panic!("expected NotAuthenticated, got {other:?}"),
    }
}

#[test]
fn private_projects_read_as_missing_to_strangers() {
    let (service, _) = build_portfolio();
    let owner = seeker(1);
    let hidden = publish(&service, &owner, "Scratchpad", false);

    match service.get_project(Some(&seeker(2)), hidden.id) {
        Err(BoardError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    match service.get_project(None, hidden.id) {
        Err(BoardError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(
        service.get_project(Some(&owner), hidden.id).expect("owner reads").id,
        hidden.id
    );
    assert!(service.get_project(Some(&staff(9)), hidden.id).is_ok());
}

#[test]
fn only_the_owner_edits_or_deletes_a_project() {
    let (service, store) = build_portfolio();
    let owner = seeker(1);
    let project = publish(&service, &owner, "Ledger", true);
    let later = now() + chrono::Duration::hours(2);

    let changes = ProjectChanges {
        title: Some("  Ledger v2 ".to_string()),
        is_public: Some(false),
        ..ProjectChanges::default()
    };
    match service.update_project(Some(&seeker(2)), project.id, changes.clone(), later) {
        Err(BoardError::AccessDenied {
            reason: DenialReason::NotOwner,
        }) => {}
        other => panic!("expected NotOwner, got {other:?}"),
    }

    let updated = service
        .update_project(Some(&owner), project.id, changes, later)
        .expect("owner edits");
    assert_eq!(updated.title, "Ledger v2");
    assert!(!updated.is_public);
    assert_eq!(updated.updated_at, later);
    assert_eq!(updated.created_at, now());

    match service.delete_project(Some(&seeker(2)), project.id) {
        Err(BoardError::AccessDenied {
            reason: DenialReason::NotOwner,
        }) => {}
        other => panic!("expected NotOwner, got {other:?}"),
    }
    service
        .delete_project(Some(&owner), project.id)
        .expect("owner deletes");
    assert!(store.fetch_project(project.id).expect("store").is_none());
}

#[test]
fn tags_are_staff_curated_and_unique_ignoring_case() {
    let (service, _) = build_portfolio();
    let admin = staff(9);

    match service.create_tag(Some(&seeker(1)), "Rust") {
        Err(BoardError::AccessDenied {
            reason: DenialReason::WrongRole,
        }) => {}
        other => panic!("expected WrongRole, got {other:?}"),
    }

    let rust = service.create_tag(Some(&admin), "  Rust ").expect("admin creates");
    assert_eq!(rust.name, "Rust");
    match service.create_tag(Some(&admin), "rust") {
        Err(BoardError::Conflict(_)) => {}
        other => panic!("expected Conflict, got {other:?}"),
    }
    match service.create_tag(Some(&admin), "") {
        Err(BoardError::Validation { field: "name", .. }) => {}
        other => panic!("expected Validation, got {other:?}"),
    }

    service.create_tag(Some(&admin), "CLI").expect("admin creates");
    let names: Vec<String> = service
        .list_tags(Some(&seeker(1)))
        .expect("signed-in callers list tags")
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(names, vec!["CLI".to_string(), "Rust".to_string()]);
}

#[test]
fn deleting_a_tag_detaches_it_from_projects() {
    let (service, _) = build_portfolio();
    let admin = staff(9);
    let owner = seeker(1);
    let rust = service.create_tag(Some(&admin), "Rust").expect("tag");
    let web = service.create_tag(Some(&admin), "Web").expect("tag");

    let project = service
        .create_project(Some(&owner), draft("Ledger", true, vec![web.id, rust.id]), now())
        .expect("owner creates");
    assert_eq!(project.tags, vec![rust.clone(), web.clone()]);

    service.delete_tag(Some(&admin), rust.id).expect("admin deletes");
    let project = service
        .get_project(Some(&owner), project.id)
        .expect("owner reads");
    assert_eq!(project.tags, vec![web]);
}

#[test]
fn unknown_tag_ids_are_rejected() {
    let (service, store) = build_portfolio();
    let owner = seeker(1);

    match service.create_project(Some(&owner), draft("Ledger", true, vec![TagId(77)]), now()) {
        Err(BoardError::NotFound(what)) => assert_eq!(what, "tag-77"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(store.projects().expect("store").is_empty());

    match store.delete_tag(TagId(77)) {
        Err(RepositoryError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}
