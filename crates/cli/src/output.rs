//! Plain-text rendering for the terminal.

use bookshelf_core::{Book, BookDetail, PageView};

fn line(book: &Book) -> String {
    format!(
        "{:<12} {} ({}) by {}\n",
        book.id,
        book.title,
        book.published_year,
        book.author_line()
    )
}

pub fn page(view: &PageView) -> String {
    if view.match_count == 0 {
        return "No books found\n".to_string();
    }

    let mut out: String = view.items.iter().map(line).collect();
    out.push_str(&format!(
        "\nPage {} of {} ({} matching)",
        view.page, view.total_pages, view.match_count
    ));
    if view.has_next() {
        out.push_str(&format!(", next: --page {}", view.page + 1));
    }
    out.push('\n');
    out
}

pub fn detail(detail: &BookDetail) -> String {
    let book = &detail.book;
    let mut out = format!(
        "{}\nby {}\nPublished: {}\nCover: {}\nFavorite: {}\n",
        book.title,
        book.author_line(),
        book.published_year,
        book.cover_image,
        if detail.is_favorite { "yes" } else { "no" }
    );
    if !book.description.is_empty() {
        out.push_str(&format!("\n{}\n", book.description));
    }
    out
}

pub fn favorites(books: &[Book]) -> String {
    if books.is_empty() {
        return "No favorites yet\n".to_string();
    }
    books.iter().map(line).collect()
}
