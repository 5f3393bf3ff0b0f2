//! XML sitemaps and robots.txt.

use crate::content::ContentEntity;
use crate::markdown::escape_html;
use crate::schema::ContentKind;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{self, Write};

const XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// Sub-sitemap file names, in index order.
pub const SITEMAP_FILES: [&str; 4] = [
    "sitemap-pages.xml",
    "sitemap-blog.xml",
    "sitemap-projects.xml",
    "sitemap-services.xml",
];

/// Sub-sitemap file listing `kind`.
pub fn file_for(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Post => "sitemap-blog.xml",
        ContentKind::Project => "sitemap-projects.xml",
        ContentKind::Service => "sitemap-services.xml",
    }
}

fn cadence(kind: ContentKind) -> (ChangeFreq, f32) {
    match kind {
        ContentKind::Post => (ChangeFreq::Weekly, 0.7),
        ContentKind::Project => (ChangeFreq::Monthly, 0.6),
        ContentKind::Service => (ChangeFreq::Monthly, 0.8),
    }
}

fn lastmod(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Homepage and listing pages.
pub fn static_entries(site_url: &str, now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let mut out = vec![SitemapEntry {
        loc: format!("{}/", site_url),
        lastmod: Some(now),
        changefreq: ChangeFreq::Daily,
        priority: 1.0,
    }];
    for kind in ContentKind::ALL {
        out.push(SitemapEntry {
            loc: format!("{}{}", site_url, kind.listing_path()),
            lastmod: Some(now),
            changefreq: ChangeFreq::Weekly,
            priority: 0.8,
        });
    }
    out
}

/// Detail pages for published, indexable entities.
pub fn content_entries(site_url: &str, kind: ContentKind, entities: &[ContentEntity]) -> Vec<SitemapEntry> {
    let (changefreq, priority) = cadence(kind);
    entities
        .iter()
        .filter(|e| e.kind() == kind && e.is_indexable())
        .map(|e| {
            let s = e.summary();
            SitemapEntry {
                loc: format!("{}{}", site_url, s.path()),
                lastmod: Some(s.updated_at),
                changefreq,
                priority,
            }
        })
        .collect()
}

pub fn urlset(entries: &[SitemapEntry]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(out, "<urlset xmlns=\"{}\">", XMLNS);
    for e in entries {
        out.push_str("  <url>\n");
        let _ = writeln!(out, "    <loc>{}</loc>", escape_html(&e.loc));
        if let Some(t) = &e.lastmod {
            let _ = writeln!(out, "    <lastmod>{}</lastmod>", lastmod(t));
        }
        let _ = writeln!(out, "    <changefreq>{}</changefreq>", e.changefreq);
        let _ = writeln!(out, "    <priority>{:.1}</priority>", e.priority);
        out.push_str("  </url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

pub fn index(site_url: &str, now: DateTime<Utc>) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(out, "<sitemapindex xmlns=\"{}\">", XMLNS);
    for file in SITEMAP_FILES {
        out.push_str("  <sitemap>\n");
        let _ = writeln!(out, "    <loc>{}</loc>", escape_html(&format!("{}/{}", site_url, file)));
        let _ = writeln!(out, "    <lastmod>{}</lastmod>", lastmod(&now));
        out.push_str("  </sitemap>\n");
    }
    out.push_str("</sitemapindex>\n");
    out
}

pub fn robots_txt(site_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /dashboard\nDisallow: /udyomx-admin\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        site_url
    )
}
