use crate::domain::{RawCell, RawRow, RowLayout, SourceDescriptor};
use crate::error::{Result, ScrapeError};
use crate::infrastructure::Session;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Reads every candidate row of the loaded page in document order.
///
/// Rows are not judged here: header rows, dividers and short rows come back
/// as-is and are filtered by validation.
pub async fn extract(session: &mut Session, source: &SourceDescriptor) -> Result<Vec<RawRow>> {
    let html = session.page_source().await?;
    let rows = parse_rows(&html, &source.rows)?;
    debug!("{}: read {} candidate rows", source.key, rows.len());
    Ok(rows)
}

pub fn parse_rows(html: &str, layout: &RowLayout) -> Result<Vec<RawRow>> {
    let document = Html::parse_document(html);

    match layout {
        RowLayout::Table {
            row_selector,
            cell_selector,
        } => {
            let row_selector = parse_selector(row_selector)?;
            let cell_selector = parse_selector(cell_selector)?;

            Ok(document
                .select(&row_selector)
                .map(|row| RawRow::new(row.select(&cell_selector).map(read_cell).collect()))
                .collect())
        }
        RowLayout::Cards {
            card_selector,
            fields,
        } => {
            let card_selector = parse_selector(card_selector)?;
            let fields = fields
                .iter()
                .map(|f| parse_selector(f))
                .collect::<Result<Vec<_>>>()?;

            Ok(document
                .select(&card_selector)
                .map(|card| {
                    RawRow::new(
                        fields
                            .iter()
                            .map(|field| card.select(field).next().map(read_cell).unwrap_or_default())
                            .collect(),
                    )
                })
                .collect())
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector(format!("{selector}: {e}")))
}

/// Reads a cell's flattened text plus the nested link, divs and image that
/// the flattened text would merge together.
fn read_cell(cell: ElementRef) -> RawCell {
    let anchor = if cell.value().name() == "a" {
        Some(cell)
    } else {
        cell.select(&ANCHOR).next()
    };
    let image = if cell.value().name() == "img" {
        Some(cell)
    } else {
        cell.select(&IMAGE).next()
    };

    RawCell {
        text: element_text(cell),
        anchor_text: anchor.map(element_text),
        href: anchor.and_then(|a| a.value().attr("href")).map(str::to_string),
        divs: cell.select(&DIV).map(element_text).collect(),
        image_src: image.and_then(|i| i.value().attr("src")).map(str::to_string),
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().nfc().collect::<String>().trim().to_string()
}
