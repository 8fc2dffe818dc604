use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use libris_config::{Config, ConfigManager};
use std::path::PathBuf;

mod commands;
mod session;

use session::Session;

fn id_arg(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).value_name(value_name).help(help)
}

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .value_name("YYYY-MM-DD")
        .help("Date to record (defaults to the library's current date)")
}

fn category_arg() -> Arg {
    Arg::new("category")
        .short('c')
        .long("category")
        .value_name("CATEGORY")
        .help("Science, Technology, Literature, History, Art or Other")
}

fn build_cli() -> Command {
    Command::new("libris")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Libris Developers")
        .about("Library catalog, circulation and overdue tracking")
        .arg(
            Arg::new("data")
                .long("data")
                .value_name("PATH")
                .help("Library data file (defaults to the configured or platform location)")
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the settings file and an empty data file"))
        // ===== Books =====
        .subcommand(
            Command::new("add-book")
                .about("Add a book to the catalog")
                .arg(id_arg("id", "BOOK_ID", "Unique book ID"))
                .arg(Arg::new("title").required(true).value_name("TITLE").help("Book title"))
                .arg(
                    Arg::new("author")
                        .short('a')
                        .long("author")
                        .value_name("AUTHOR")
                        .help("Author")
                        .default_value(""),
                )
                .arg(category_arg().default_value("Other"))
                .arg(
                    Arg::new("copies")
                        .short('n')
                        .long("copies")
                        .value_name("COUNT")
                        .help("Number of copies")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("1"),
                ),
        )
        .subcommand(
            Command::new("edit-book")
                .about("Change a book's details or copy counts")
                .arg(id_arg("id", "BOOK_ID", "Book ID"))
                .arg(
                    Arg::new("title")
                        .short('t')
                        .long("title")
                        .value_name("TITLE")
                        .help("New title"),
                )
                .arg(
                    Arg::new("author")
                        .short('a')
                        .long("author")
                        .value_name("AUTHOR")
                        .help("New author"),
                )
                .arg(category_arg())
                .arg(
                    Arg::new("total")
                        .long("total")
                        .value_name("COUNT")
                        .help("Total copies")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("available")
                        .long("available")
                        .value_name("COUNT")
                        .help("Copies on the shelf")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("lost")
                        .long("lost")
                        .help("Mark the book as lost")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("remove-book")
                .about("Remove a book from the catalog (its loan history is kept)")
                .arg(id_arg("id", "BOOK_ID", "Book ID")),
        )
        .subcommand(
            Command::new("books")
                .about("List the catalog")
                .arg(category_arg()),
        )
        .subcommand(
            Command::new("search")
                .about("Search books by title or author")
                .arg(
                    Arg::new("keyword")
                        .value_name("KEYWORD")
                        .help("Text to look for")
                        .default_value(""),
                )
                .arg(category_arg())
                .arg(
                    Arg::new("title-only")
                        .long("title-only")
                        .help("Match titles only")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("author-only")
                        .long("author-only")
                        .help("Match authors only")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("title-only"),
                ),
        )
        .subcommand(
            Command::new("book")
                .about("Show a book with its loans and reservations")
                .arg(id_arg("id", "BOOK_ID", "Book ID")),
        )
        // ===== Readers =====
        .subcommand(
            Command::new("add-reader")
                .about("Register a reader")
                .arg(id_arg("id", "READER_ID", "Unique reader ID"))
                .arg(Arg::new("name").required(true).value_name("NAME").help("Reader name"))
                .arg(
                    Arg::new("dept")
                        .short('d')
                        .long("dept")
                        .value_name("DEPT")
                        .help("Department")
                        .default_value(""),
                )
                .arg(
                    Arg::new("phone")
                        .short('p')
                        .long("phone")
                        .value_name("PHONE")
                        .help("Phone number")
                        .default_value(""),
                )
                .arg(date_arg().help("Registration date (defaults to the library's current date)")),
        )
        .subcommand(
            Command::new("edit-reader")
                .about("Change a reader's details")
                .arg(id_arg("id", "READER_ID", "Reader ID"))
                .arg(Arg::new("name").long("name").value_name("NAME").help("New name"))
                .arg(
                    Arg::new("dept")
                        .short('d')
                        .long("dept")
                        .value_name("DEPT")
                        .help("New department"),
                )
                .arg(
                    Arg::new("phone")
                        .short('p')
                        .long("phone")
                        .value_name("PHONE")
                        .help("New phone number"),
                )
                .arg(
                    Arg::new("deactivate")
                        .long("deactivate")
                        .help("Mark the reader as not valid")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("activate")
                        .long("activate")
                        .help("Mark the reader as valid")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("deactivate"),
                ),
        )
        .subcommand(
            Command::new("remove-reader")
                .about("Remove a reader (loan history is kept)")
                .arg(id_arg("id", "READER_ID", "Reader ID")),
        )
        .subcommand(Command::new("readers").about("List readers"))
        .subcommand(
            Command::new("search-readers")
                .about("Search readers by ID, name, department or phone")
                .arg(
                    Arg::new("keyword")
                        .required(true)
                        .value_name("KEYWORD")
                        .help("Text to look for"),
                ),
        )
        .subcommand(
            Command::new("reader")
                .about("Show a reader with their loan history")
                .arg(id_arg("id", "READER_ID", "Reader ID")),
        )
        // ===== Circulation =====
        .subcommand(
            Command::new("borrow")
                .about("Lend a copy of a book to a reader")
                .arg(id_arg("reader", "READER_ID", "Reader ID"))
                .arg(id_arg("book", "BOOK_ID", "Book ID"))
                .arg(date_arg()),
        )
        .subcommand(
            Command::new("return")
                .about("Take back a borrowed copy")
                .arg(id_arg("reader", "READER_ID", "Reader ID"))
                .arg(id_arg("book", "BOOK_ID", "Book ID"))
                .arg(date_arg()),
        )
        .subcommand(
            Command::new("reserve")
                .about("Reserve a book that has no copy on the shelf")
                .arg(id_arg("reader", "READER_ID", "Reader ID"))
                .arg(id_arg("book", "BOOK_ID", "Book ID")),
        )
        .subcommand(
            Command::new("records")
                .about("List loan records")
                .arg(
                    Arg::new("reader")
                        .long("reader")
                        .value_name("READER_ID")
                        .help("Only this reader's loans"),
                )
                .arg(
                    Arg::new("book")
                        .long("book")
                        .value_name("BOOK_ID")
                        .help("Only loans of this book"),
                )
                .arg(
                    Arg::new("open")
                        .long("open")
                        .help("Only loans not yet returned")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("overdue").about("List loans past their due date"))
        .subcommand(
            Command::new("reservations")
                .about("List reservations")
                .arg(
                    Arg::new("book")
                        .long("book")
                        .value_name("BOOK_ID")
                        .help("Only reservations of this book"),
                ),
        )
        .subcommand(Command::new("stats").about("Show library statistics"))
        .subcommand(
            Command::new("clock")
                .about("Show or change the library's current date")
                .subcommand(Command::new("show").about("Show the current date"))
                .subcommand(
                    Command::new("set")
                        .about("Pin the current date")
                        .arg(
                            Arg::new("date")
                                .required(true)
                                .value_name("YYYY-MM-DD")
                                .help("Simulated date"),
                        ),
                )
                .subcommand(Command::new("reset").about("Follow the real date again")),
        )
        .subcommand(
            Command::new("clear")
                .about("Delete every book, reader, record and reservation")
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Skip confirmation prompt")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export library data")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file path")
                        .default_value("library_export.json"),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Export format")
                        .value_parser(["json", "csv"])
                        .default_value("json"),
                ),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    match matches.get_one::<String>("config-dir") {
        Some(dir) => Ok(ConfigManager::with_directory(PathBuf::from(dir))),
        None => ConfigManager::new().context("Failed to locate settings directory"),
    }
}

fn data_path(matches: &ArgMatches, config: &Config) -> Result<PathBuf> {
    if let Some(path) = matches.get_one::<String>("data") {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = &config.storage.data_file {
        return Ok(path.clone());
    }
    libris_library::default_data_path().context("Failed to locate data directory")
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = config_manager(&matches)?;
    let (config, config_error) = match manager.load_with_env_overrides() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}, using defaults", e);
    }
    if !config.app.color_output {
        console::set_colors_enabled(false);
    }

    let data_path = data_path(&matches, &config)?;

    let Some((name, sub_matches)) = matches.subcommand() else {
        build_cli().print_help()?;
        return Ok(());
    };

    if name == "init" {
        return commands::init(&manager, &data_path, config);
    }

    let mut session = Session::open(data_path, config)?;
    let state = &mut session.state;

    match name {
        "add-book" => commands::add_book(state, sub_matches)?,
        "edit-book" => commands::edit_book(state, sub_matches)?,
        "remove-book" => commands::remove_book(state, sub_matches)?,
        "books" => commands::list_books(state, sub_matches)?,
        "search" => commands::search_books(state, sub_matches)?,
        "book" => commands::show_book(state, sub_matches)?,
        "add-reader" => commands::add_reader(state, sub_matches)?,
        "edit-reader" => commands::edit_reader(state, sub_matches)?,
        "remove-reader" => commands::remove_reader(state, sub_matches)?,
        "readers" => commands::list_readers(state)?,
        "search-readers" => commands::search_readers(state, sub_matches)?,
        "reader" => commands::show_reader(state, sub_matches)?,
        "borrow" => commands::borrow_book(state, sub_matches)?,
        "return" => commands::return_book(state, sub_matches)?,
        "reserve" => commands::reserve_book(state, sub_matches)?,
        "records" => commands::list_records(state, sub_matches)?,
        "overdue" => commands::list_overdue(state)?,
        "reservations" => commands::list_reservations(state, sub_matches)?,
        "stats" => commands::show_stats(state)?,
        "clock" => commands::clock(state, sub_matches)?,
        "clear" => commands::clear(state, sub_matches)?,
        "export" => commands::export_library(state, sub_matches)?,
        _ => {
            build_cli().print_help()?;
            return Ok(());
        }
    }

    session.finish(&manager)
}
