//! HTTP handlers for content CRUD, revalidation, sign-in, pages, and sitemaps.

pub mod auth;
pub mod content;
pub mod pages;
pub mod revalidate;
pub mod sitemap;
