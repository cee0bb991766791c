use crate::config::RenderConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// 页面渲染能力：把 PDF 渲染成按物理页序排列的 JPEG 文件，写在 work_dir 下
pub trait PageRenderer {
    fn render_pages(
        &self,
        pdf_path: &Path,
        work_dir: &Path,
    ) -> impl Future<Output = Result<Vec<PathBuf>>> + Send;
}

/// 调用 poppler 的 pdftoppm
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: String,
    dpi: u32,
}

const PAGE_PREFIX: &str = "page";

impl PdftoppmRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            binary: config.pdftoppm_path.clone(),
            dpi: config.dpi,
        }
    }
}

impl PageRenderer for PdftoppmRenderer {
    async fn render_pages(&self, pdf_path: &Path, work_dir: &Path) -> Result<Vec<PathBuf>> {
        let out_prefix = work_dir.join(PAGE_PREFIX);

        let output = Command::new(&self.binary)
            .arg("-jpeg")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf_path)
            .arg(&out_prefix)
            .output()
            .await
            .map_err(|e| Error::Render(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(Error::Render(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let pages = collect_rendered_pages(work_dir).await?;
        tracing::debug!("{} 渲染完成: {} 页", pdf_path.display(), pages.len());
        Ok(pages)
    }
}

/// pdftoppm 输出 page-1.jpg / page-01.jpg ...，位数随总页数变化，按数字排序
async fn collect_rendered_pages(work_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut numbered: Vec<(u32, PathBuf)> = Vec::new();

    let mut entries = tokio::fs::read_dir(work_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(page) = page_number(&path) else {
            continue;
        };
        numbered.push((page, path));
    }

    numbered.sort_by_key(|(page, _)| *page);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "jpg" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rendered_pages_sort_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.jpg", "page-02.jpg", "page-01.jpg", "page-09.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pages = collect_rendered_pages(dir.path()).await.unwrap();
        let names: Vec<String> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["page-01.jpg", "page-02.jpg", "page-09.jpg", "page-10.jpg"]);
    }

    #[tokio::test]
    async fn missing_binary_is_a_render_error() {
        let renderer = PdftoppmRenderer {
            binary: "/nonexistent/pdftoppm".to_string(),
            dpi: 150,
        };
        let dir = tempfile::tempdir().unwrap();

        let err = renderer
            .render_pages(Path::new("missing.pdf"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
