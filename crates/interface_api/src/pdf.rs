//! Printable bill documents
//!
//! Renders a [`BillBreakdown`] onto a single A4 page with the builtin
//! Helvetica faces, so no font files ship with the service. PDF coordinates
//! start at the bottom-left corner; the layout cursor walks down from the top
//! margin.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use rust_decimal::Decimal;

use domain_billing::{BillBreakdown, ChargeKind, ChargeLine};

use crate::error::ApiError;

/// Media type of rendered bills
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const ISSUER: &str = "ACME ELECTRICITY";
const ISSUER_TAGLINE: &str = "Power Distribution Services";
const CURRENCY: &str = "Tk";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const AMOUNT_X: f32 = 160.0;

const PAYMENT_NOTES: [&str; 3] = [
    "- Please pay within 15 days from bill date",
    "- Keep your reference number for payment tracking",
    "- For queries: support@acme-electricity.com",
];

/// File name offered for download, `bill-<YYYY-MM>.pdf`
pub fn attachment_filename(bill: &BillBreakdown) -> String {
    format!("bill-{}.pdf", bill.billing_month)
}

/// Renders a bill as a one-page PDF
///
/// # Arguments
///
/// * `bill` - A calculated bill; amounts are printed as stored
///
/// # Returns
///
/// The encoded document, starting with the `%PDF` header
///
/// # Errors
///
/// Returns `ApiError::Internal` if a font cannot be registered or the
/// document cannot be serialized
pub fn render_bill(bill: &BillBreakdown) -> Result<Vec<u8>, ApiError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Electricity bill {}", bill.billing_month),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Bill",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_error)?;

    {
        let mut sheet = Sheet {
            layer: doc.get_page(page).get_layer(layer),
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        };
        draw_bill(&mut sheet, bill);
    }

    doc.save_to_bytes().map_err(render_error)
}

fn draw_bill(sheet: &mut Sheet, bill: &BillBreakdown) {
    sheet.ink(ACCENT);
    sheet.bold_text(ISSUER, 22.0, 70.0);
    sheet.advance(7.0);
    sheet.ink(MUTED);
    sheet.text(ISSUER_TAGLINE, 10.0, 82.0);
    sheet.advance(14.0);

    sheet.ink(BLACK);
    sheet.bold_text("ELECTRICITY BILL", 16.0, 78.0);
    sheet.advance(12.0);

    sheet.text(&format!("Bill Month: {}", bill.billing_month), 10.0, MARGIN);
    sheet.text(
        &format!("Bill Date: {}", bill.calculation_date.format("%d/%m/%Y")),
        10.0,
        AMOUNT_X - 10.0,
    );
    sheet.advance(6.0);
    if let Some(name) = &bill.consumer_name {
        sheet.text(&format!("Consumer: {}", name), 10.0, MARGIN);
        sheet.advance(6.0);
    }
    if let Some(id) = &bill.consumer_id {
        sheet.text(&format!("Consumer ID: {}", id), 10.0, MARGIN);
        sheet.advance(6.0);
    }
    sheet.text(&format!("Consumer Type: {}", bill.consumer_type), 10.0, MARGIN);
    sheet.advance(12.0);

    sheet.ink(ACCENT);
    sheet.text("Total Consumption", 11.0, MARGIN);
    sheet.advance(10.0);
    sheet.bold_text(&format!("{} kWh", bill.units_consumed.normalize()), 24.0, MARGIN);
    sheet.advance(14.0);

    sheet.ink(BLACK);
    sheet.bold_text("Bill Summary", 13.0, MARGIN);
    sheet.advance(4.0);
    sheet.rule();
    sheet.advance(8.0);

    for tier in &bill.tier_breakdown {
        let label = format!(
            "{} ({} kWh x {} {:.3})",
            tier.tier_name,
            tier.units_in_tier.normalize(),
            CURRENCY,
            tier.rate_per_unit
        );
        sheet.amount_row(&label, tier.amount);
    }
    for line in bill.taxes.iter().chain(&bill.surcharges) {
        sheet.amount_row(&charge_label(line), line.amount);
    }

    sheet.advance(2.0);
    sheet.rule();
    sheet.advance(10.0);

    sheet.ink(ACCENT);
    sheet.bold_text("Total Amount", 14.0, MARGIN);
    sheet.bold_text(&money(bill.total_amount), 14.0, AMOUNT_X);
    sheet.advance(16.0);

    sheet.ink(BLACK);
    sheet.bold_text("Payment Information", 11.0, MARGIN);
    sheet.advance(6.0);
    sheet.ink(MUTED);
    for note in PAYMENT_NOTES {
        sheet.text(note, 9.0, MARGIN);
        sheet.advance(5.0);
    }

    sheet.advance(10.0);
    sheet.text(
        "This is a computer-generated bill. Thank you for using ACME Electricity.",
        8.0,
        48.0,
    );
}

fn charge_label(line: &ChargeLine) -> String {
    match line.kind {
        ChargeKind::Percentage => format!("{} ({}%)", line.name, line.value.normalize()),
        ChargeKind::PerKwh => format!("{} ({} {} per kWh)", line.name, CURRENCY, line.value.normalize()),
        ChargeKind::Fixed => line.name.clone(),
    }
}

fn money(amount: Decimal) -> String {
    format!("{} {:.2}", CURRENCY, amount)
}

fn render_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(format!("Failed to render bill document: {}", err))
}

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const MUTED: (f32, f32, f32) = (0.42, 0.45, 0.50);
const ACCENT: (f32, f32, f32) = (0.15, 0.39, 0.92);

/// Layer plus a top-down cursor in millimetres
struct Sheet {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Sheet {
    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn ink(&self, (r, g, b): (f32, f32, f32)) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    fn text(&self, text: &str, size: f32, x: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), &self.regular);
    }

    fn bold_text(&self, text: &str, size: f32, x: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), &self.bold);
    }

    fn amount_row(&mut self, label: &str, amount: Decimal) {
        self.ink(MUTED);
        self.text(label, 10.0, MARGIN);
        self.ink(BLACK);
        self.bold_text(&money(amount), 10.0, AMOUNT_X);
        self.advance(8.0);
    }

    fn rule(&self) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.90, 0.91, 0.92, None)));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(self.y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain_billing::{BillCalculator, BillRequest};
    use domain_tariff::{ConsumerType, EffectiveRate};
    use rust_decimal_macros::dec;

    fn bill() -> BillBreakdown {
        let request = BillRequest::new(ConsumerType::Residential, dec!(100))
            .with_consumer(Some("Jane Consumer".to_string()), Some("C-001".to_string()))
            .for_month("2024-03".parse().unwrap());
        BillCalculator::default()
            .flat(&request, &EffectiveRate::DEFAULT, Utc::now())
            .unwrap()
    }

    #[test]
    fn test_render_produces_pdf_document() {
        let bytes = render_bill(&bill()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_attachment_named_after_billing_month() {
        assert_eq!(attachment_filename(&bill()), "bill-2024-03.pdf");
    }

    #[test]
    fn test_charge_labels() {
        let bill = bill();
        assert_eq!(charge_label(&bill.taxes[0]), "VAT (15%)");
        assert_eq!(charge_label(&bill.surcharges[0]), "Service Charge");
        assert_eq!(money(dec!(18.8)), "Tk 18.80");
    }
}
