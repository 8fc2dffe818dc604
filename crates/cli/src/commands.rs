use crate::session::Session;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::ArgMatches;
use console::style;
use libris_config::{Config, ConfigManager};
use libris_core::{
    format_date, parse_date, Book, BookCategory, BookStatus, BorrowRecord, LibraryStats, Reader,
    Reservation, Validator,
};
use libris_library::{BookQuery, LibraryState};
use serde::Serialize;
use std::path::Path;

/// Create the settings file and an empty data file
pub fn init(manager: &ConfigManager, data_path: &Path, config: Config) -> Result<()> {
    if manager.initialize().context("Failed to write settings")? {
        println!(
            "{} Settings created at {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!("Settings already exist at {}", manager.config_path().display());
    }

    if data_path.exists() {
        println!("Data file already exists at {}", data_path.display());
    } else {
        let session = Session::open(data_path.to_path_buf(), config)?;
        session.save()?;
        println!("{} Data file created at {}", style("✓").green().bold(), data_path.display());
    }

    Ok(())
}

// ===== Books =====

/// Add a book to the catalog
pub fn add_book(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let title = required(matches, "title")?;
    let author = optional(matches, "author").unwrap_or_default();
    let category = match optional(matches, "category") {
        Some(text) => parse_category(text)?,
        None => BookCategory::Other,
    };
    let copies = matches.get_one::<u32>("copies").copied().unwrap_or(1);

    let book = Book::new(id, title, author, category, copies, copies);
    ensure_valid(&book, "book")?;
    state.add_book(book)?;

    println!("{} Book added: {} ({} copies)", style("✓").green().bold(), id, copies);
    Ok(())
}

/// Change a book's details or copy counts
pub fn edit_book(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let mut book = state.find_book(id)?.clone();

    if let Some(title) = optional(matches, "title") {
        book.title = title.to_string();
    }
    if let Some(author) = optional(matches, "author") {
        book.author = author.to_string();
    }
    if let Some(category) = optional(matches, "category") {
        book.category = parse_category(category)?;
    }
    if let Some(total) = matches.get_one::<u32>("total") {
        book.set_total_copies(*total);
    }
    if let Some(available) = matches.get_one::<u32>("available") {
        book.set_available_copies(*available);
    }
    if matches.get_flag("lost") {
        book.mark_lost();
    }

    ensure_valid(&book, "book")?;
    state.update_book(book)?;

    println!("{} Book updated: {}", style("✓").green().bold(), id);
    Ok(())
}

/// Remove a book from the catalog
pub fn remove_book(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let book = state.remove_book(id)?;
    println!("{} Book removed: {}", style("✓").green().bold(), book.title);
    Ok(())
}

/// List the catalog
pub fn list_books(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let mut query = BookQuery::default();
    if let Some(category) = optional(matches, "category") {
        query = query.with_category(parse_category(category)?);
    }
    let books = state.search_books(&query);

    if books.is_empty() {
        println!("No books in the catalog. Use 'add-book' to add one.");
        return Ok(());
    }

    println!("\n{} Books", style(books.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for book in books {
        print_book_summary(book);
    }
    Ok(())
}

/// Search books by title or author
pub fn search_books(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let keyword = optional(matches, "keyword").unwrap_or_default();
    let mut query = BookQuery::keyword(keyword);
    if let Some(category) = optional(matches, "category") {
        query = query.with_category(parse_category(category)?);
    }
    if matches.get_flag("title-only") {
        query = query.title_only();
    }
    if matches.get_flag("author-only") {
        query = query.author_only();
    }

    let results = state.search_books(&query);
    if results.is_empty() {
        println!("No books found matching '{}'", keyword);
        return Ok(());
    }

    println!("\n{} Search Results for '{}'", style(results.len()).bold().cyan(), keyword);
    println!("{}", "=".repeat(80));
    for book in results {
        print_book_summary(book);
    }
    Ok(())
}

/// Show a book with its loans and reservations
pub fn show_book(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let book = state.find_book(id)?;

    println!("\n{}", style("Book Information").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", book.id);
    println!("Title: {}", style(&book.title).bold());
    println!("Author: {}", book.author);
    println!("Category: {}", book.category);
    println!(
        "Copies: {} available of {} ({} on loan)",
        book.available_copies(),
        book.total_copies(),
        book.borrowed_copies()
    );
    println!("Status: {}", styled_status(book.status()));

    let records = state.records_for_book(id);
    if !records.is_empty() {
        println!("\nLoans:");
        let today = state.current_date();
        for record in records {
            print_record(record, today);
        }
    }

    let reservers = state.reservers_for_book(id);
    if !reservers.is_empty() {
        println!("\nReserved by: {}", reservers.join(", "));
    }
    Ok(())
}

// ===== Readers =====

/// Register a reader
pub fn add_reader(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let name = required(matches, "name")?;
    let dept = optional(matches, "dept").unwrap_or_default();
    let phone = optional(matches, "phone").unwrap_or_default();
    let register_date = optional_date(matches)?.unwrap_or_else(|| state.current_date());

    let reader = Reader::new(id, name, dept, phone, register_date);
    ensure_valid(&reader, "reader")?;
    state.add_reader(reader)?;

    println!(
        "{} Reader registered: {} on {}",
        style("✓").green().bold(),
        id,
        format_date(register_date)
    );
    Ok(())
}

/// Change a reader's details
pub fn edit_reader(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let mut reader = state.find_reader(id)?.clone();

    if let Some(name) = optional(matches, "name") {
        reader.name = name.to_string();
    }
    if let Some(dept) = optional(matches, "dept") {
        reader.dept = dept.to_string();
    }
    if let Some(phone) = optional(matches, "phone") {
        reader.phone = phone.to_string();
    }
    if matches.get_flag("deactivate") {
        reader.is_valid = false;
    }
    if matches.get_flag("activate") {
        reader.is_valid = true;
    }

    ensure_valid(&reader, "reader")?;
    state.update_reader(reader)?;

    println!("{} Reader updated: {}", style("✓").green().bold(), id);
    Ok(())
}

/// Remove a reader
pub fn remove_reader(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let reader = state.remove_reader(id)?;
    println!("{} Reader removed: {}", style("✓").green().bold(), reader.name);
    Ok(())
}

/// List readers
pub fn list_readers(state: &LibraryState) -> Result<()> {
    let readers: Vec<&Reader> = state.readers().collect();
    print_readers(&readers, "No readers registered. Use 'add-reader' to add one.");
    Ok(())
}

/// Search readers by ID, name, department or phone
pub fn search_readers(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let keyword = required(matches, "keyword")?;
    let readers = state.search_readers(keyword);
    print_readers(&readers, &format!("No readers found matching '{}'", keyword));
    Ok(())
}

/// Show a reader with their loan history
pub fn show_reader(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let reader = state.find_reader(id)?;

    println!("\n{}", style("Reader Information").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", reader.id);
    println!("Name: {}", style(&reader.name).bold());
    println!("Department: {}", reader.dept);
    println!("Phone: {}", reader.phone);
    println!("Registered: {}", format_date(reader.register_date));
    println!("Valid: {}", if reader.is_valid { "Yes" } else { "No" });

    let records = state.records_for_reader(id);
    if records.is_empty() {
        println!("\nNo loans.");
    } else {
        println!("\nLoans:");
        let today = state.current_date();
        for record in records {
            print_record(record, today);
        }
    }
    Ok(())
}

// ===== Circulation =====

/// Lend a copy of a book to a reader
pub fn borrow_book(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let reader_id = required(matches, "reader")?;
    let book_id = required(matches, "book")?;
    let date = optional_date(matches)?;

    let reader = state.find_reader(reader_id)?;
    if !reader.is_valid {
        bail!("Reader {} is not valid and cannot borrow", reader_id);
    }

    let record = state.borrow_book(reader_id, book_id, date)?;
    println!("{} Borrowed {} to {}", style("✓").green().bold(), book_id, reader_id);
    println!("  Borrowed: {}", format_date(record.borrow_date()));
    println!("  Due: {}", style(format_date(record.due_date())).bold());
    Ok(())
}

/// Take back a borrowed copy
pub fn return_book(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let reader_id = required(matches, "reader")?;
    let book_id = required(matches, "book")?;
    let date = optional_date(matches)?;

    let record = state.return_book(reader_id, book_id, date)?;
    let returned = record.return_date().unwrap_or(record.due_date());

    println!("{} Returned {} from {}", style("✓").green().bold(), book_id, reader_id);
    if returned > record.due_date() {
        let late = (returned - record.due_date()).num_days();
        println!("  {}", style(format!("Returned {} days late", late)).yellow());
    }

    let reservers = state.reservers_for_book(book_id);
    if !reservers.is_empty() {
        println!("  Reserved by: {}", reservers.join(", "));
    }
    Ok(())
}

/// Reserve a book that has no copy on the shelf
pub fn reserve_book(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    let reader_id = required(matches, "reader")?;
    let book_id = required(matches, "book")?;

    state.find_reader(reader_id)?;
    state.reserve_book(reader_id, book_id)?;

    println!("{} {} reserved {}", style("✓").green().bold(), reader_id, book_id);
    Ok(())
}

/// List loan records
pub fn list_records(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let reader = optional(matches, "reader");
    let book = optional(matches, "book");
    let open_only = matches.get_flag("open");

    let records: Vec<&BorrowRecord> = state
        .borrow_records()
        .iter()
        .filter(|r| reader.is_none_or(|id| r.reader_id() == id))
        .filter(|r| book.is_none_or(|id| r.book_id() == id))
        .filter(|r| !open_only || !r.is_returned())
        .collect();

    if records.is_empty() {
        println!("No loan records.");
        return Ok(());
    }

    println!("\n{} Loan Records", style(records.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    let today = state.current_date();
    for record in records {
        print_record(record, today);
    }
    Ok(())
}

/// List loans past their due date
pub fn list_overdue(state: &LibraryState) -> Result<()> {
    let today = state.current_date();
    let overdue = state.overdue_records();

    if overdue.is_empty() {
        println!("No overdue loans as of {}.", format_date(today));
        return Ok(());
    }

    println!(
        "\n{} Overdue Loans as of {}",
        style(overdue.len()).bold().red(),
        format_date(today)
    );
    println!("{}", "=".repeat(80));
    for record in overdue {
        let title = state
            .find_book(record.book_id())
            .map(|b| b.title.as_str())
            .unwrap_or("(removed)");
        let name = state
            .find_reader(record.reader_id())
            .map(|r| r.name.as_str())
            .unwrap_or("(removed)");
        println!(
            "{} {} borrowed by {} {}: due {}, {} days overdue",
            record.book_id(),
            style(title).bold(),
            record.reader_id(),
            name,
            format_date(record.due_date()),
            style(record.days_overdue(today)).red().bold()
        );
    }
    Ok(())
}

/// List reservations
pub fn list_reservations(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let book = optional(matches, "book");
    let reservations: Vec<&Reservation> = state
        .reservations()
        .iter()
        .filter(|r| book.is_none_or(|id| r.book_id == id))
        .collect();

    if reservations.is_empty() {
        println!("No reservations.");
        return Ok(());
    }

    println!("\n{} Reservations", style(reservations.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for reservation in reservations {
        println!("  {} -> {}", reservation.reader_id, reservation.book_id);
    }
    Ok(())
}

/// Show library statistics
pub fn show_stats(state: &LibraryState) -> Result<()> {
    let stats = state.stats();

    println!("\n{}", style("Library Statistics").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Books: {}", style(state.book_count()).bold());
    println!("Readers: {}", style(stats.reader_count).bold());
    println!("Total Copies: {}", style(stats.total_copies).bold());
    println!(
        "Available: {} ({:.1}%)",
        stats.available_copies,
        stats.available_percentage()
    );
    println!(
        "On Loan: {} ({:.1}%)",
        stats.borrowed_copies,
        stats.borrowed_percentage()
    );
    println!("Overdue Loans: {}", state.overdue_records().len());
    println!("\nCopies by Category ({} in use):", stats.categories_in_use);
    for (category, copies) in &stats.category_totals {
        println!("  {:<12} {}", category.label(), copies);
    }
    Ok(())
}

/// Show or change the library's current date
pub fn clock(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("set", sub_matches)) => {
            let date = parse_date_arg(required(sub_matches, "date")?)?;
            state.set_current_date(date);
            println!("{} Library date set to {}", style("✓").green().bold(), format_date(date));
        }
        Some(("reset", _)) => {
            state.reset_to_real_time();
            println!(
                "{} Library follows the real date again ({})",
                style("✓").green().bold(),
                format_date(state.current_date())
            );
        }
        _ => {
            let mode = if state.is_using_custom_time() { "simulated" } else { "real" };
            let today = format_date(state.current_date());
            println!("Current date: {} ({})", style(today).bold(), mode);
        }
    }
    Ok(())
}

/// Delete every book, reader, record and reservation
pub fn clear(state: &mut LibraryState, matches: &ArgMatches) -> Result<()> {
    if !matches.get_flag("force") {
        println!("Are you sure you want to delete all library data? (y/N)");
        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Clear cancelled.");
            return Ok(());
        }
    }

    state.clear_all_data();
    println!("{} All library data cleared", style("✓").green().bold());
    Ok(())
}

/// Export library data
pub fn export_library(state: &LibraryState, matches: &ArgMatches) -> Result<()> {
    let output = optional(matches, "output").unwrap_or("library_export.json");
    let format = optional(matches, "format").unwrap_or("json");

    let content = match format {
        "json" => export_json(state)?,
        "csv" => books_csv(state.books()),
        _ => bail!("Unsupported format: {}", format),
    };
    std::fs::write(output, content).context("Failed to write export file")?;

    println!(
        "{} Exported {} books to {}",
        style("✓").green().bold(),
        state.book_count(),
        output
    );
    Ok(())
}

/// Everything in the library, as written by `export --format json`
#[derive(Serialize)]
struct LibraryExport<'a> {
    exported_on: NaiveDate,
    simulated_date: Option<NaiveDate>,
    books: Vec<&'a Book>,
    readers: Vec<&'a Reader>,
    borrow_records: &'a [BorrowRecord],
    reservations: &'a [Reservation],
    stats: LibraryStats,
}

fn export_json(state: &LibraryState) -> Result<String> {
    let export = LibraryExport {
        exported_on: state.current_date(),
        simulated_date: state.custom_date(),
        books: state.books().collect(),
        readers: state.readers().collect(),
        borrow_records: state.borrow_records(),
        reservations: state.reservations(),
        stats: state.stats(),
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize to JSON")
}

fn books_csv<'a>(books: impl Iterator<Item = &'a Book>) -> String {
    let mut csv = String::from("id,title,author,category,total_copies,available_copies,status\n");
    for book in books {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            book.id,
            book.title,
            book.author,
            book.category,
            book.total_copies(),
            book.available_copies(),
            book.status()
        ));
    }
    csv
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    optional(matches, name).ok_or_else(|| anyhow!("{} is required", name))
}

fn optional<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches.get_one::<String>(name).map(String::as_str)
}

fn optional_date(matches: &ArgMatches) -> Result<Option<NaiveDate>> {
    optional(matches, "date").map(parse_date_arg).transpose()
}

fn parse_date_arg(text: &str) -> Result<NaiveDate> {
    parse_date(text).ok_or_else(|| anyhow!("Invalid date '{}', expected YYYY-MM-DD", text))
}

fn parse_category(text: &str) -> Result<BookCategory> {
    text.parse().map_err(anyhow::Error::msg)
}

fn ensure_valid(item: &impl Validator, what: &str) -> Result<()> {
    item.validate()
        .map_err(|errors| anyhow!("Invalid {}: {}", what, errors.join("; ")))
}

fn styled_status(status: BookStatus) -> console::StyledObject<&'static str> {
    let label = status.label();
    match status {
        BookStatus::Available => style(label).green(),
        BookStatus::Borrowed => style(label).yellow(),
        BookStatus::Reserved => style(label).magenta(),
        BookStatus::Lost => style(label).red(),
    }
}

fn print_book_summary(book: &Book) {
    println!("\n{}", style(&book.title).bold());
    if !book.author.is_empty() {
        println!("  by {}", book.author);
    }
    println!(
        "  ID: {} | {} | {}/{} available | {}",
        book.id,
        book.category,
        book.available_copies(),
        book.total_copies(),
        styled_status(book.status())
    );
}

fn print_readers(readers: &[&Reader], empty_message: &str) {
    if readers.is_empty() {
        println!("{}", empty_message);
        return;
    }

    println!("\n{} Readers", style(readers.len()).bold().cyan());
    println!("{}", "=".repeat(80));
    for reader in readers {
        let marker = if reader.is_valid {
            String::new()
        } else {
            format!(" {}", style("(not valid)").red())
        };
        println!(
            "  {} {}{} | {} | {} | since {}",
            reader.id,
            style(&reader.name).bold(),
            marker,
            reader.dept,
            reader.phone,
            format_date(reader.register_date)
        );
    }
}

fn print_record(record: &BorrowRecord, today: NaiveDate) {
    let state = match record.return_date() {
        Some(date) => format!("returned {}", format_date(date)),
        None if record.is_overdue(today) => style(format!(
            "OVERDUE by {} days",
            record.days_overdue(today)
        ))
        .red()
        .bold()
        .to_string(),
        None => "on loan".to_string(),
    };
    println!(
        "  {} -> {} | borrowed {} | due {} | {}",
        record.reader_id(),
        record.book_id(),
        format_date(record.borrow_date()),
        format_date(record.due_date()),
        state
    );
}

#[cfg(test)]
mod tests;
