mod support;

use awskit_core::ssm::{
    delete_parameters, list_parameter_names, referenced_parameters, unused_parameters,
};

#[tokio::test]
async fn unreferenced_parameters_are_identified_for_deletion() {
    let store = support::seeded_source_store();
    let dir = tempfile::tempdir().expect("temp dir");
    let template = support::write_source_template(&dir);

    let referenced = referenced_parameters(&template, "test1").expect("scan template");
    let remote = list_parameter_names(&store, "test1").await.expect("list names");
    let unused = unused_parameters(&remote, &referenced);

    assert_eq!(unused, vec!["/test1/source/param3".to_string()]);
}

#[tokio::test]
async fn deleting_the_plan_leaves_referenced_parameters_alone() {
    let store = support::seeded_source_store();
    let dir = tempfile::tempdir().expect("temp dir");
    let template = support::write_source_template(&dir);

    let referenced = referenced_parameters(&template, "test1").expect("scan template");
    let remote = list_parameter_names(&store, "test1").await.expect("list names");
    let unused = unused_parameters(&remote, &referenced);
    delete_parameters(&store, &unused).await.expect("delete");

    assert_eq!(store.deleted(), vec!["/test1/source/param3".to_string()]);
    assert!(store.parameter("/test1/source/param1").is_some());
    assert!(store.parameter("/test1/source/param2").is_some());
    assert!(store.parameter("/test1/source/param3").is_none());
}

#[tokio::test]
async fn a_second_reconcile_finds_nothing_to_delete() {
    let store = support::seeded_source_store();
    let dir = tempfile::tempdir().expect("temp dir");
    let template = support::write_source_template(&dir);

    let referenced = referenced_parameters(&template, "test1").expect("scan template");
    let remote = list_parameter_names(&store, "test1").await.expect("list names");
    delete_parameters(&store, &unused_parameters(&remote, &referenced))
        .await
        .expect("delete");

    let remote = list_parameter_names(&store, "test1").await.expect("list names");
    assert!(unused_parameters(&remote, &referenced).is_empty());
}

#[tokio::test]
async fn a_template_matching_nothing_references_no_parameters() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("empty.yaml");
    std::fs::write(&path, "Resources: {}\n").expect("write template file");

    let referenced = referenced_parameters(path.to_str().expect("utf8 path"), "test1")
        .expect("scan template");

    // An empty reference set is the caller's cue to stop before listing
    // the store; otherwise the whole subtree would read as unused.
    assert!(referenced.is_empty());
}
