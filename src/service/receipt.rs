use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};
use crate::models::Bill;
use crate::service::aggregator::format_amount;

/// 小票渲染器
///
/// 明细按账单中的顺序输出，合计行直接使用 `Bill::total`。
pub trait ReceiptFormatter: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
    fn render(&self, bill: &Bill, store: &StoreConfig) -> AppResult<Vec<u8>>;
}

const RULE: &str = "-------------------------------------------";
const THANK_YOU: &str = "Thank you for shopping with us!";

// A4, 单位 pt
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_TOP: i64 = 790;
const MARGIN_BOTTOM: i64 = 60;
const ROW_HEIGHT: i64 = 22;
const COLUMNS: [i64; 4] = [50, 300, 370, 470];

/// PDF 小票 (lopdf, 内置 Helvetica 字体)
#[derive(Debug, Clone, Default)]
pub struct PdfReceipt;

impl PdfReceipt {
    pub fn new() -> Self {
        Self
    }
}

/// 单页内容构建器，写满后换页
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: MARGIN_TOP,
        }
    }

    fn ensure_room(&mut self) {
        if self.y < MARGIN_BOTTOM {
            self.pages.push(Vec::new());
            self.y = MARGIN_TOP;
        }
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        // pages 至少有一页
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, x: i64, size: i64, text: &str) {
        let y = self.y;
        let ops = self.current();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new("Tj", vec![Object::String(win_ansi(text), StringFormat::Literal)]));
        ops.push(Operation::new("ET", vec![]));
    }

    fn centered(&mut self, size: i64, text: &str) {
        // Helvetica 平均字宽约 0.5em
        let width = text.chars().count() as i64 * size / 2;
        let x = ((PAGE_WIDTH - width) / 2).max(COLUMNS[0]);
        self.text(x, size, text);
        self.advance();
    }

    fn row(&mut self, size: i64, cells: [&str; 4]) {
        self.ensure_room();
        for (x, cell) in COLUMNS.iter().zip(cells) {
            self.text(*x, size, cell);
        }
        let y = self.y - 6;
        let ops = self.current();
        ops.push(Operation::new("m", vec![COLUMNS[0].into(), y.into()]));
        ops.push(Operation::new("l", vec![(PAGE_WIDTH - COLUMNS[0]).into(), y.into()]));
        ops.push(Operation::new("S", vec![]));
        self.advance();
    }

    fn advance(&mut self) {
        self.y -= ROW_HEIGHT;
    }
}

/// 内置字体只覆盖 WinAnsi (Latin-1) 字符，其余字符替换为 `?`
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7e | 0xa0..=0xff) => code as u8,
            _ => b'?',
        })
        .collect()
}

impl ReceiptFormatter for PdfReceipt {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, bill: &Bill, store: &StoreConfig) -> AppResult<Vec<u8>> {
        let mut writer = PageWriter::new();

        // 店铺抬头
        writer.centered(14, &store.name);
        writer.centered(12, &format!("{} | Ph: {}", store.address, store.phone));
        writer.centered(12, RULE);

        // 表头 + 明细
        writer.row(12, ["Item", "Qty", "Price", "Total"]);
        for line in bill.lines() {
            let count = line.count().to_string();
            let price = format!("Rs. {}", format_amount(line.unit_price()));
            let extended = format!("Rs. {}", format_amount(&line.extended()));
            writer.row(12, [line.name(), &count, &price, &extended]);
        }

        // 合计
        writer.ensure_room();
        writer.centered(12, RULE);
        let total = format!("Rs. {}", format_amount(bill.total()));
        writer.row(14, ["Total Amount:", "", "", &total]);
        writer.ensure_room();
        writer.centered(12, RULE);
        writer.ensure_room();
        writer.centered(14, THANK_YOU);

        build_document(writer.pages)
    }
}

fn build_document(pages: Vec<Vec<Operation>>) -> AppResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// CSV 小票
#[derive(Debug, Clone, Default)]
pub struct CsvReceipt;

impl CsvReceipt {
    pub fn new() -> Self {
        Self
    }
}

impl ReceiptFormatter for CsvReceipt {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, bill: &Bill, store: &StoreConfig) -> AppResult<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record([store.name.as_str()])?;
        writer.write_record([store.address.as_str(), store.phone.as_str()])?;
        writer.write_record(["Item", "Qty", "Price", "Total"])?;
        for line in bill.lines() {
            writer.write_record([
                line.name().to_string(),
                line.count().to_string(),
                format!("₹{}", format_amount(line.unit_price())),
                format!("₹{}", format_amount(&line.extended())),
            ])?;
        }
        writer.write_record([
            "Total Amount".to_string(),
            format!("₹{}", format_amount(bill.total())),
        ])?;

        writer
            .into_inner()
            .map_err(|e| AppError::Render(e.to_string()))
    }
}
