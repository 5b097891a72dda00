//! DNS record templates
//!
//! A template is a small CSV file (`type,name,content,ttl,proxied,priority`)
//! describing the default records for a newly onboarded domain. Content may
//! reference the placeholder domain in dotted (`yourdomain.com`) or
//! hyphenated (`yourdomain-com`) form; both are replaced at render time.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cloudflare::DnsRecordRequest;

pub mod apply;

pub use apply::{add_zones, apply_records, split_domains, RecordOutcome, ZoneOutcome};

pub const PLACEHOLDER_DOMAIN: &str = "yourdomain.com";
pub const PLACEHOLDER_SLUG: &str = "yourdomain-com";

/// Record name that maps to the zone apex.
const ROOT_NAME: &str = "@";

/// TTL value Cloudflare treats as "automatic".
const AUTO_TTL: u32 = 1;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("DNS template file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read DNS template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One parsed template row, placeholders still in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRow {
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
    pub priority: Option<u16>,
}

impl TemplateRow {
    /// Parses a data line; `None` when type or content is missing.
    fn parse(line_number: usize, line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |index: usize| fields.get(index).copied().unwrap_or_default();

        let record_type = field(0);
        let content = field(2);
        if record_type.is_empty() || content.is_empty() {
            warn!(
                "Skipping DNS template line {}: missing record type or content",
                line_number
            );
            return None;
        }

        Some(Self {
            record_type: record_type.to_string(),
            name: field(1).to_string(),
            content: content.to_string(),
            ttl: field(3)
                .parse::<u32>()
                .ok()
                .filter(|ttl| *ttl != 0)
                .unwrap_or(AUTO_TTL),
            proxied: field(4).eq_ignore_ascii_case("true"),
            priority: field(5).parse::<u16>().ok(),
        })
    }

    /// Absolute record name for `domain`.
    pub fn record_name(&self, domain: &str) -> String {
        if self.name.is_empty() || self.name == ROOT_NAME {
            domain.to_string()
        } else {
            format!("{}.{}", self.name, domain)
        }
    }

    /// Content with both placeholder forms replaced by `domain`.
    pub fn record_content(&self, domain: &str) -> String {
        let slug = domain.replace('.', "-");
        self.content
            .replace(PLACEHOLDER_DOMAIN, domain)
            .replace(PLACEHOLDER_SLUG, &slug)
    }

    pub fn render(&self, domain: &str) -> DnsRecordRequest {
        DnsRecordRequest {
            record_type: self.record_type.clone(),
            name: self.record_name(domain),
            content: self.record_content(domain),
            ttl: self.ttl,
            proxied: self.proxied,
            priority: self.priority,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTemplate {
    rows: Vec<TemplateRow>,
}

impl RecordTemplate {
    /// Parses template text. Blank lines and the header line are skipped.
    pub fn parse(text: &str) -> Self {
        let rows = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .skip(1)
            .filter_map(|(index, line)| TemplateRow::parse(index + 1, line))
            .collect();

        Self { rows }
    }

    pub async fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TemplateError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(TemplateError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let template = Self::parse(&text);
        debug!(
            "Loaded DNS template {} ({} records)",
            path.display(),
            template.len()
        );
        Ok(template)
    }

    pub fn rows(&self) -> &[TemplateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records ready to send for `domain`, in template order.
    pub fn render(&self, domain: &str) -> Vec<DnsRecordRequest> {
        self.rows.iter().map(|row| row.render(domain)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Type,Name,Content,TTL,Proxied,Priority

MX,@,aspmx.l.google.com,3600,false,1
CNAME,www,yourdomain.com,,TRUE,
TXT,_dmarc,v=DMARC1; p=none; rua=mailto:dmarc@yourdomain.com,0,false,

CNAME,mail,yourdomain-com.mail.example.net,300,false,
";

    fn row(name: &str, content: &str) -> TemplateRow {
        TemplateRow {
            record_type: "CNAME".to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: 1,
            proxied: false,
            priority: None,
        }
    }

    #[test]
    fn test_parse_skips_header_and_blank_lines() {
        let template = RecordTemplate::parse(SAMPLE);

        assert_eq!(template.len(), 4);
        let types: Vec<&str> = template
            .rows()
            .iter()
            .map(|r| r.record_type.as_str())
            .collect();
        assert_eq!(types, ["MX", "CNAME", "TXT", "CNAME"]);
    }

    #[test]
    fn test_parse_coerces_ttl_proxied_priority() {
        let template = RecordTemplate::parse(SAMPLE);
        let rows = template.rows();

        assert_eq!(rows[0].ttl, 3600);
        assert_eq!(rows[0].priority, Some(1));
        assert!(!rows[0].proxied);

        // empty and zero TTLs fall back to automatic
        assert_eq!(rows[1].ttl, 1);
        assert_eq!(rows[2].ttl, 1);
        assert!(rows[1].proxied);
        assert_eq!(rows[1].priority, None);
    }

    #[test]
    fn test_parse_drops_rows_without_type_or_content() {
        let template = RecordTemplate::parse("type,name,content\nA,www,\n,www,1.2.3.4\nA,api,1.2.3.4\n");

        assert_eq!(template.len(), 1);
        assert_eq!(template.rows()[0].name, "api");
    }

    #[test]
    fn test_header_only_template_is_empty() {
        assert!(RecordTemplate::parse("type,name,content,ttl,proxied,priority\n").is_empty());
        assert!(RecordTemplate::parse("").is_empty());
    }

    #[test]
    fn test_record_name_mapping() {
        assert_eq!(row("@", "x").record_name("example.com"), "example.com");
        assert_eq!(row("www", "x").record_name("example.com"), "www.example.com");
    }

    #[test]
    fn test_placeholder_substitution() {
        assert_eq!(
            row("mail", "mail.yourdomain.com").record_content("example.org"),
            "mail.example.org"
        );
        assert_eq!(
            row("mail", "yourdomain-com.mx.example.net").record_content("example.org"),
            "example-org.mx.example.net"
        );
        assert_eq!(
            row("sub", "a.yourdomain.com b.yourdomain.com").record_content("my.shop.io"),
            "a.my.shop.io b.my.shop.io"
        );
    }

    #[test]
    fn test_render_keeps_template_order() {
        let records = RecordTemplate::parse(SAMPLE).render("example.org");

        assert_eq!(records[0].name, "example.org");
        assert_eq!(records[0].content, "aspmx.l.google.com");
        assert_eq!(records[1].name, "www.example.org");
        assert_eq!(records[1].content, "example.org");
        assert_eq!(
            records[2].content,
            "v=DMARC1; p=none; rua=mailto:dmarc@example.org"
        );
        assert_eq!(records[3].content, "example-org.mail.example.net");
    }

    #[tokio::test]
    async fn test_bundled_workspace_template() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/google_workspace.csv");
        let template = RecordTemplate::load(&path).await.unwrap();

        assert!(!template.is_empty());
        for record in template.render("example.com") {
            assert!(!record.content.contains(PLACEHOLDER_DOMAIN));
            assert!(!record.content.contains(PLACEHOLDER_SLUG));
            assert!(record.name.ends_with("example.com"));
        }
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecordTemplate::load(&dir.path().join("missing.csv"))
            .await
            .unwrap_err();

        assert!(matches!(err, TemplateError::NotFound(_)));
    }
}
