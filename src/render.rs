use crate::{indexes::Hit, timing::Timed, Product};

pub const NO_RESULTS: &str = "No results found.";

/// `1: GPS Tracker — tracking device (₹1499) [Score: 0.87]`
pub fn console_line(hit: &Hit) -> String {
    let Product {
        id,
        name,
        description,
        price,
    } = &hit.product;
    let mut line = format!("{id}: {name} — {description} (₹{price})");
    if let Some(score) = hit.score {
        line.push_str(&format!(" [Score: {score:.2}]"));
    }
    line
}

/// Full console report of one timed search.
pub fn console_report(backend: &str, keyword: &str, hits: &Timed<Vec<Hit>>) -> String {
    let mut out = format!("\nSearch results for '{keyword}':\n");
    for hit in &hits.value {
        out.push_str(&console_line(hit));
        out.push('\n');
    }
    out.push_str(&format!(
        "\n⏱️ {backend} search for '{keyword}' took {:.3} seconds",
        hits.secs()
    ));
    out
}

/// `ID: 1, Name: GPS Tracker, Description: tracking device, Price: ₹1499`
pub fn form_line(product: &Product) -> String {
    format!(
        "ID: {}, Name: {}, Description: {}, Price: ₹{}",
        product.id, product.name, product.description, product.price
    )
}

pub fn search_header(keyword: &str, secs: f64) -> String {
    format!("Search results for '{keyword}' (Time: {secs:.4} sec):")
}

pub const VIEW_ALL_HEADER: &str = "All products:";

/// The text shown in the form's output area.
pub fn form_text(header: &str, lines: &[String]) -> String {
    let mut out = format!("{header}\n\n");
    if lines.is_empty() {
        out.push_str(NO_RESULTS);
    } else {
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
