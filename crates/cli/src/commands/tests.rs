use super::*;
use libris_core::LibraryError;
use tempfile::TempDir;

fn parse(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["libris"];
    argv.extend_from_slice(args);
    let mut matches = crate::build_cli().try_get_matches_from(argv).unwrap();
    let (_, sub_matches) = matches.remove_subcommand().unwrap();
    sub_matches
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_state() -> LibraryState {
    let mut state = LibraryState::new();
    state.set_current_date(date(2024, 3, 1));
    add_book(
        &mut state,
        &parse(&[
            "add-book",
            "B0001",
            "Rust in Action",
            "-a",
            "McNamara",
            "-c",
            "Technology",
            "-n",
            "2",
        ]),
    )
    .unwrap();
    add_book(
        &mut state,
        &parse(&["add-book", "B0002", "Ways of Seeing", "-a", "Berger", "-c", "Art"]),
    )
    .unwrap();
    add_reader(
        &mut state,
        &parse(&["add-reader", "R001", "Zhang San", "-d", "Physics", "-p", "555"]),
    )
    .unwrap();
    add_reader(&mut state, &parse(&["add-reader", "R002", "Li Si"])).unwrap();
    state
}

#[test]
fn test_add_book_uses_defaults() {
    let mut state = LibraryState::new();
    add_book(&mut state, &parse(&["add-book", "B9", "Untitled"])).unwrap();

    let book = state.find_book("B9").unwrap();
    assert_eq!(book.author, "");
    assert_eq!(book.category, BookCategory::Other);
    assert_eq!(book.total_copies(), 1);
    assert_eq!(book.available_copies(), 1);
    assert_eq!(book.status(), BookStatus::Available);
}

#[test]
fn test_add_book_rejects_duplicate() {
    let mut state = sample_state();
    let err = add_book(&mut state, &parse(&["add-book", "B0001", "Again"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LibraryError>(),
        Some(LibraryError::DuplicateBook(_))
    ));
}

#[test]
fn test_add_book_rejects_comma_in_title() {
    let mut state = LibraryState::new();
    let err = add_book(&mut state, &parse(&["add-book", "B1", "Salt, Fat"])).unwrap_err();
    assert!(err.to_string().starts_with("Invalid book"));
    assert_eq!(state.book_count(), 0);
}

#[test]
fn test_add_book_rejects_unknown_category() {
    let mut state = LibraryState::new();
    assert!(add_book(&mut state, &parse(&["add-book", "B1", "T", "-c", "Cooking"])).is_err());
}

#[test]
fn test_edit_book_changes_fields() {
    let mut state = sample_state();
    edit_book(
        &mut state,
        &parse(&[
            "edit-book",
            "B0002",
            "-t",
            "Ways of Seeing (2nd ed.)",
            "--total",
            "3",
            "--available",
            "3",
        ]),
    )
    .unwrap();

    let book = state.find_book("B0002").unwrap();
    assert_eq!(book.title, "Ways of Seeing (2nd ed.)");
    assert_eq!(book.author, "Berger");
    assert_eq!(book.total_copies(), 3);
    assert_eq!(book.available_copies(), 3);
}

#[test]
fn test_edit_book_marks_lost() {
    let mut state = sample_state();
    edit_book(&mut state, &parse(&["edit-book", "B0002", "--lost"])).unwrap();
    assert_eq!(state.find_book("B0002").unwrap().status(), BookStatus::Lost);
}

#[test]
fn test_edit_missing_book_fails() {
    let mut state = sample_state();
    assert!(edit_book(&mut state, &parse(&["edit-book", "B404", "-t", "X"])).is_err());
}

#[test]
fn test_remove_book() {
    let mut state = sample_state();
    remove_book(&mut state, &parse(&["remove-book", "B0002"])).unwrap();
    assert_eq!(state.book_count(), 1);
    assert!(remove_book(&mut state, &parse(&["remove-book", "B0002"])).is_err());
}

#[test]
fn test_list_and_search_commands_succeed() {
    let state = sample_state();
    list_books(&state, &parse(&["books"])).unwrap();
    list_books(&state, &parse(&["books", "-c", "Art"])).unwrap();
    search_books(&state, &parse(&["search", "rust", "--title-only"])).unwrap();
    search_books(&state, &parse(&["search", "nothing-matches"])).unwrap();
    show_book(&state, &parse(&["book", "B0001"])).unwrap();
    list_readers(&state).unwrap();
    search_readers(&state, &parse(&["search-readers", "physics"])).unwrap();
    show_reader(&state, &parse(&["reader", "R001"])).unwrap();
    show_stats(&state).unwrap();
}

#[test]
fn test_search_flags_conflict() {
    let result = crate::build_cli().try_get_matches_from([
        "libris",
        "search",
        "x",
        "--title-only",
        "--author-only",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_add_reader_defaults_to_library_date() {
    let state = sample_state();
    assert_eq!(state.find_reader("R002").unwrap().register_date, date(2024, 3, 1));
}

#[test]
fn test_add_reader_with_explicit_date() {
    let mut state = LibraryState::new();
    let matches = parse(&["add-reader", "R9", "Wang Wu", "--date", "2023-09-01"]);
    add_reader(&mut state, &matches).unwrap();
    assert_eq!(state.find_reader("R9").unwrap().register_date, date(2023, 9, 1));
}

#[test]
fn test_add_reader_rejects_bad_date() {
    let mut state = LibraryState::new();
    let matches = parse(&["add-reader", "R9", "Wang Wu", "--date", "09/01/2023"]);
    let err = add_reader(&mut state, &matches).unwrap_err();
    assert!(err.to_string().contains("Invalid date"));
}

#[test]
fn test_edit_reader_deactivates() {
    let mut state = sample_state();
    let matches = parse(&["edit-reader", "R002", "-d", "History", "--deactivate"]);
    edit_reader(&mut state, &matches).unwrap();

    let reader = state.find_reader("R002").unwrap();
    assert_eq!(reader.dept, "History");
    assert!(!reader.is_valid);
}

#[test]
fn test_remove_reader() {
    let mut state = sample_state();
    remove_reader(&mut state, &parse(&["remove-reader", "R002"])).unwrap();
    assert_eq!(state.reader_count(), 1);
}

#[test]
fn test_borrow_and_return() {
    let mut state = sample_state();
    borrow_book(&mut state, &parse(&["borrow", "R001", "B0001"])).unwrap();

    let book = state.find_book("B0001").unwrap();
    assert_eq!(book.available_copies(), 1);
    let record = &state.borrow_records()[0];
    assert_eq!(record.borrow_date(), date(2024, 3, 1));
    assert_eq!(record.due_date(), date(2024, 3, 31));

    return_book(&mut state, &parse(&["return", "R001", "B0001", "--date", "2024-04-05"])).unwrap();
    assert_eq!(state.find_book("B0001").unwrap().available_copies(), 2);
    assert_eq!(state.borrow_records()[0].return_date(), Some(date(2024, 4, 5)));
}

#[test]
fn test_borrow_requires_known_reader() {
    let mut state = sample_state();
    let err = borrow_book(&mut state, &parse(&["borrow", "R404", "B0001"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LibraryError>(),
        Some(LibraryError::ReaderNotFound(_))
    ));
    assert_eq!(state.find_book("B0001").unwrap().available_copies(), 2);
    assert!(state.borrow_records().is_empty());
}

#[test]
fn test_borrow_refused_for_invalid_reader() {
    let mut state = sample_state();
    edit_reader(&mut state, &parse(&["edit-reader", "R002", "--deactivate"])).unwrap();
    assert!(borrow_book(&mut state, &parse(&["borrow", "R002", "B0001"])).is_err());
    assert!(state.borrow_records().is_empty());
}

#[test]
fn test_return_without_loan_fails() {
    let mut state = sample_state();
    borrow_book(&mut state, &parse(&["borrow", "R001", "B0001"])).unwrap();

    let err = return_book(&mut state, &parse(&["return", "R002", "B0001"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LibraryError>(),
        Some(LibraryError::NoActiveLoan { .. })
    ));
    assert_eq!(state.find_book("B0001").unwrap().available_copies(), 1);
}

#[test]
fn test_reserve_after_last_copy_is_out() {
    let mut state = sample_state();
    assert!(reserve_book(&mut state, &parse(&["reserve", "R002", "B0002"])).is_err());

    borrow_book(&mut state, &parse(&["borrow", "R001", "B0002"])).unwrap();
    reserve_book(&mut state, &parse(&["reserve", "R002", "B0002"])).unwrap();

    assert_eq!(state.find_book("B0002").unwrap().status(), BookStatus::Reserved);
    assert_eq!(state.reservers_for_book("B0002"), vec!["R002"]);
    list_reservations(&state, &parse(&["reservations", "--book", "B0002"])).unwrap();
}

#[test]
fn test_reserve_requires_known_reader() {
    let mut state = sample_state();
    borrow_book(&mut state, &parse(&["borrow", "R001", "B0002"])).unwrap();
    assert!(reserve_book(&mut state, &parse(&["reserve", "R404", "B0002"])).is_err());
    assert!(state.reservations().is_empty());
}

#[test]
fn test_overdue_follows_clock_command() {
    let mut state = sample_state();
    borrow_book(&mut state, &parse(&["borrow", "R001", "B0001"])).unwrap();
    assert!(state.overdue_records().is_empty());

    let mut clock_matches = crate::build_cli()
        .try_get_matches_from(["libris", "clock", "set", "2024-04-15"])
        .unwrap();
    let (_, clock_sub) = clock_matches.remove_subcommand().unwrap();
    clock(&mut state, &clock_sub).unwrap();

    assert_eq!(state.current_date(), date(2024, 4, 15));
    assert_eq!(state.overdue_records().len(), 1);
    list_overdue(&state).unwrap();
    list_records(&state, &parse(&["records", "--reader", "R001", "--open"])).unwrap();
}

#[test]
fn test_clock_reset_and_bad_date() {
    let mut state = sample_state();
    assert!(clock(&mut state, &parse(&["clock", "set", "tomorrow"])).is_err());
    assert!(state.is_using_custom_time());

    clock(&mut state, &parse(&["clock", "reset"])).unwrap();
    assert!(!state.is_using_custom_time());
    clock(&mut state, &parse(&["clock"])).unwrap();
}

#[test]
fn test_clear_with_force() {
    let mut state = sample_state();
    borrow_book(&mut state, &parse(&["borrow", "R001", "B0001"])).unwrap();

    clear(&mut state, &parse(&["clear", "--force"])).unwrap();
    assert_eq!(state.book_count(), 0);
    assert_eq!(state.reader_count(), 0);
    assert!(state.borrow_records().is_empty());
}

#[test]
fn test_export_json() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("export.json");
    let output_arg = output.to_str().unwrap();

    let mut state = sample_state();
    borrow_book(&mut state, &parse(&["borrow", "R001", "B0002"])).unwrap();
    export_library(&state, &parse(&["export", "-o", output_arg])).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["books"].as_array().unwrap().len(), 2);
    assert_eq!(json["readers"].as_array().unwrap().len(), 2);
    assert_eq!(json["borrow_records"].as_array().unwrap().len(), 1);
    assert_eq!(json["stats"]["total_copies"], 3);
    assert_eq!(json["stats"]["borrowed_copies"], 1);
    assert_eq!(json["simulated_date"], "2024-03-01");
}

#[test]
fn test_export_csv() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("books.csv");
    let output_arg = output.to_str().unwrap();

    let state = sample_state();
    export_library(&state, &parse(&["export", "-o", output_arg, "-f", "csv"])).unwrap();

    let csv = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,title,author"));
    assert!(lines[1].starts_with("B0001,Rust in Action,McNamara,"));
}

#[test]
fn test_init_creates_settings_and_data_file() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_directory(temp_dir.path().join("config"));
    let data_path = temp_dir.path().join("data").join("library_data.lib");

    init(&manager, &data_path, Config::default()).unwrap();
    assert!(manager.config_path().exists());
    assert!(data_path.exists());

    init(&manager, &data_path, Config::default()).unwrap();
}

#[test]
fn test_books_csv_layout() {
    let book = Book::new("B1", "T", "A", BookCategory::History, 4, 1);
    let csv = books_csv(std::iter::once(&book));
    assert_eq!(csv.lines().nth(1), Some("B1,T,A,History,4,1,Available"));
}

#[test]
fn test_parse_helpers() {
    assert_eq!(parse_date_arg("2024-02-29").unwrap(), date(2024, 2, 29));
    assert!(parse_date_arg("2024-02-30").is_err());
    assert_eq!(parse_category("Science").unwrap(), BookCategory::Science);
}
