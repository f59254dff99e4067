mod common;

use common::{repo_fixture, Scripted};
use repwriter::navigator::select_folder;
use tempfile::tempdir;

#[test]
fn empty_folder_offers_select_and_back() {
    let dir = tempdir().unwrap();

    let mut script = Scripted::new(&["1"]);
    assert_eq!(
        select_folder(&mut script, dir.path()).unwrap(),
        Some(dir.path().to_path_buf())
    );

    let mut script = Scripted::new(&["2"]);
    assert_eq!(select_folder(&mut script, dir.path()).unwrap(), None);
}

#[test]
fn invalid_choices_reprompt_at_same_level() {
    let dir = tempdir().unwrap();
    let mut script = Scripted::new(&["abc", "0", "9", "", "S"]);

    let picked = select_folder(&mut script, dir.path()).unwrap();
    assert_eq!(picked, Some(dir.path().to_path_buf()));
    assert_eq!(script.asked.len(), 5);
}

#[test]
fn descends_into_subfolder() {
    let repo = repo_fixture(&["htb/easy", "thm"]);
    let mut script = Scripted::new(&["1", "1", "s"]);

    let picked = select_folder(&mut script, repo.path()).unwrap();
    assert_eq!(picked, Some(repo.path().join("htb").join("easy")));
}

#[test]
fn backing_out_of_child_returns_to_parent() {
    let repo = repo_fixture(&["htb", "thm"]);
    let mut script = Scripted::new(&["2", "b", "s"]);

    let picked = select_folder(&mut script, repo.path()).unwrap();
    assert_eq!(picked, Some(repo.path().to_path_buf()));
}

#[test]
fn backing_out_of_top_level_selects_nothing() {
    let repo = repo_fixture(&["htb"]);
    let mut script = Scripted::new(&["b"]);
    assert_eq!(select_folder(&mut script, repo.path()).unwrap(), None);

    // "Go back" by number: one folder, so 3 is back
    let mut script = Scripted::new(&["3"]);
    assert_eq!(select_folder(&mut script, repo.path()).unwrap(), None);
}
