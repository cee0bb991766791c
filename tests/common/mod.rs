#![allow(dead_code)]

use label_reorder::extract::{ExtractSettings, PageRenderer, VisionOracle};
use label_reorder::{Error, Result};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 每页内容流为 "page N"
pub fn build_pdf(page_count: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=page_count)
        .map(|n| {
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, format!("page {n}").into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 298.into(), 420.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn page_texts(pdf: &Path) -> Vec<String> {
    let doc = Document::load(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8(doc.get_page_content(id).unwrap()).unwrap())
        .collect()
}

/// 不真正栅格化：每页写一个内容为 "<文件名>#<页码>" 的假图片
#[derive(Default)]
pub struct FakeRenderer {
    pub work_dirs: Mutex<Vec<PathBuf>>,
}

impl PageRenderer for FakeRenderer {
    async fn render_pages(&self, pdf_path: &Path, work_dir: &Path) -> Result<Vec<PathBuf>> {
        self.work_dirs.lock().unwrap().push(work_dir.to_path_buf());

        let doc = Document::load(pdf_path)?;
        let stem = pdf_path.file_stem().unwrap().to_string_lossy().into_owned();

        let mut pages = Vec::new();
        for n in 1..=doc.get_pages().len() {
            let path = work_dir.join(format!("page-{n}.jpg"));
            std::fs::write(&path, format!("{stem}#{n}"))?;
            pages.push(path);
        }
        Ok(pages)
    }
}

/// 按假图片内容返回预设回复，未登记的页返回空串
#[derive(Default)]
pub struct FakeOracle {
    replies: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeOracle {
    pub fn reply(mut self, image: &str, reply: &str) -> Self {
        self.replies.insert(image.to_string(), reply.to_string());
        self
    }
}

impl VisionOracle for FakeOracle {
    async fn extract(&self, _prompt: &str, image_jpeg: &[u8], _max_tokens: u32) -> Result<String> {
        let key = String::from_utf8_lossy(image_jpeg).into_owned();
        self.calls.lock().unwrap().push(key.clone());
        Ok(self.replies.get(&key).cloned().unwrap_or_default())
    }
}

pub struct FailingOracle;

impl VisionOracle for FailingOracle {
    async fn extract(&self, _prompt: &str, _image_jpeg: &[u8], _max_tokens: u32) -> Result<String> {
        Err(Error::Vision("connection reset".to_string()))
    }
}

pub fn settings(max_pages: Option<usize>) -> ExtractSettings {
    ExtractSettings {
        store_name: "メイアイストア amazon店".to_string(),
        delivery_note_max_tokens: 300,
        shipping_label_max_tokens: 200,
        max_pages,
    }
}

pub fn amazon(no: &str, order_id: &str, postal: &str, name: &str) -> String {
    format!(
        r#"{{"is_amazon": true, "no": "{no}", "order_id": "{order_id}", "postal_code": "{postal}", "name": "{name}"}}"#
    )
}

pub fn label(postal: &str, name: &str) -> String {
    format!(r#"{{"postal_code": "{postal}", "name": "{name}"}}"#)
}

/// 内存中的 PDF 按物理页序的内容流
pub fn page_texts_mem(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8(doc.get_page_content(id).unwrap()).unwrap())
        .collect()
}
