use crate::error::{Error, Result};
use indexmap::IndexSet;
use lopdf::{Document, Object, ObjectId};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// 可从父 Pages 节点继承的页面属性
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 按给定页序（1起）重建文档页树
///
/// 输出第 n 页 = 原文档第 page_order[n] 页，页面内容不做任何修改；
/// 未出现在 page_order 中的页被丢弃。越界或重复的页码返回错误。
pub fn reorder_pages(doc: &mut Document, page_order: &[u32]) -> Result<()> {
    let pages = doc.get_pages();
    let page_count = pages.len();

    let mut selected: IndexSet<u32> = IndexSet::with_capacity(page_order.len());
    for &page in page_order {
        if !selected.insert(page) {
            return Err(Error::DuplicatePage(page));
        }
    }

    let page_ids = selected
        .iter()
        .map(|page| {
            pages
                .get(page)
                .copied()
                .ok_or(Error::PageOutOfRange { page: *page, page_count })
        })
        .collect::<Result<Vec<ObjectId>>>()?;

    let root_pages_id = doc.catalog()?.get(b"Pages")?.as_reference()?;

    for &page_id in &page_ids {
        flatten_inherited_attributes(doc, page_id)?;
        doc.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Parent", Object::Reference(root_pages_id));
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    let root_pages = doc.get_object_mut(root_pages_id)?.as_dict_mut()?;
    root_pages.set("Kids", Object::Array(kids));
    root_pages.set("Count", Object::Integer(page_ids.len() as i64));

    // 删除不再可达的页和中间 Pages 节点
    let pruned = doc.prune_objects();
    tracing::debug!("重排后保留 {} 页, 清理 {} 个对象", page_ids.len(), pruned.len());

    Ok(())
}

/// 把页面从祖先节点继承的属性写到页面自身，避免挂到新父节点后丢失
fn flatten_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc.get_object(page_id)?.as_dict()?;
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut visited = IndexSet::new();

        while let Some(parent_id) = parent {
            if !visited.insert(parent_id) {
                break;
            }
            let node = doc.get_object(parent_id)?.as_dict()?;
            for key in INHERITABLE_KEYS {
                let already = page.has(key) || inherited.iter().any(|(k, _)| *k == key);
                if already {
                    continue;
                }
                if let Ok(value) = node.get(key) {
                    inherited.push((key, value.clone()));
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

/// 内存中的 PDF 重排
pub fn reorder_pdf_bytes(pdf: &[u8], page_order: &[u32]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(pdf)?;
    reorder_pages(&mut doc, page_order)?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// 读取送り状 PDF，按页序重排后写到 output
pub fn export_reordered(input: &Path, page_order: &[u32], output: &Path) -> Result<()> {
    let mut doc = Document::load(input)?;
    reorder_pages(&mut doc, page_order)?;

    let mut writer = BufWriter::new(File::create(output)?);
    doc.save_to(&mut writer)?;

    tracing::info!("送り状重排完成: {} 页 -> {}", page_order.len(), output.display());
    Ok(())
}
