//! Short URL command handlers.

use std::sync::Arc;

use tabled::Tabled;

use shortdeck_core::{
    Controller, ShortUrl, ShortUrlDraft, ShortUrlEdit, ShortUrlIdentifier, ShortUrlsQuery,
};

use crate::cli::{GlobalOpts, OutputFormat, ShortUrlsArgs, ShortUrlsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ShortUrlRow {
    #[tabled(rename = "Short URL")]
    short_url: String,
    #[tabled(rename = "Long URL")]
    long_url: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Visits")]
    visits: u64,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Arc<ShortUrl>> for ShortUrlRow {
    fn from(s: &Arc<ShortUrl>) -> Self {
        Self {
            short_url: s.short_url.clone(),
            long_url: util::truncate(&s.long_url, 48),
            title: s.title.clone().unwrap_or_default(),
            tags: s.tags.join(", "),
            visits: s.visits_count,
            created: s.date_created.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn detail(s: &ShortUrl) -> String {
    let mut lines = vec![
        format!("Short URL:  {}", s.short_url),
        format!("Long URL:   {}", s.long_url),
        format!("Short code: {}", s.short_code),
    ];
    if let Some(ref domain) = s.domain {
        lines.push(format!("Domain:     {domain}"));
    }
    if let Some(ref title) = s.title {
        lines.push(format!("Title:      {title}"));
    }
    if !s.tags.is_empty() {
        lines.push(format!("Tags:       {}", s.tags.join(", ")));
    }
    lines.push(format!("Visits:     {}", s.visits_count));
    if let Some(max) = s.meta.max_visits {
        lines.push(format!("Max visits: {max}"));
    }
    lines.push(format!(
        "Created:    {}",
        s.date_created.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ShortUrlsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ShortUrlsCommand::List {
            page,
            items_per_page,
            search,
            tags,
            order_by,
        } => {
            let query = ShortUrlsQuery {
                page: Some(page),
                items_per_page,
                search_term: search,
                tags,
                order_by,
            };
            controller.list_short_urls(query).await?;
            controller.settled().await?;

            let state = controller.short_urls().current();
            let Some(ref list) = state.short_urls else {
                return Ok(());
            };
            let out = output::render_list(
                &global.output(),
                &list.data,
                |s| ShortUrlRow::from(s),
                |s| s.short_url.clone(),
            )?;
            output::print_output(&out, global.quiet);

            if matches!(global.output(), OutputFormat::Table) && !global.quiet {
                let p = &list.pagination;
                eprintln!(
                    "Page {} of {} ({} short URLs)",
                    p.current_page, p.pages_count, p.total_items
                );
            }
            Ok(())
        }

        ShortUrlsCommand::Create {
            long_url,
            slug,
            domain,
            title,
            tags,
            max_visits,
        } => {
            let draft = ShortUrlDraft {
                long_url,
                custom_slug: slug,
                domain,
                title,
                tags,
                max_visits,
                find_if_exists: None,
            };
            let created = controller.create_short_url(draft).await?;
            let out = output::render_single(&global.output(), &created, detail, |s| {
                s.short_url.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShortUrlsCommand::Edit {
            short_code,
            domain,
            long_url,
            title,
            tags,
            max_visits,
            crawlable,
        } => {
            let edit = ShortUrlEdit {
                long_url,
                title,
                tags,
                max_visits,
                crawlable,
                forward_query: None,
            };
            if edit == ShortUrlEdit::default() {
                return Err(CliError::Validation {
                    field: "edit".into(),
                    reason: "nothing to change; pass at least one of --long-url, --title, \
                             --tag, --max-visits, --crawlable"
                        .into(),
                });
            }
            let id = ShortUrlIdentifier::new(short_code, domain);
            let edited = controller.edit_short_url(id, edit).await?;
            let out = output::render_single(&global.output(), &edited, detail, |s| {
                s.short_url.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShortUrlsCommand::Delete { short_code, domain } => {
            let id = ShortUrlIdentifier::new(short_code, domain);
            if !util::confirm(&format!("Delete short URL '{id}'?"), global.yes)? {
                return Ok(());
            }
            controller.delete_short_url(id).await?;
            if !global.quiet {
                eprintln!("Short URL deleted");
            }
            Ok(())
        }
    }
}
