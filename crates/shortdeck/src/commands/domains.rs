//! Domain command handlers.

use std::sync::Arc;

use tabled::Tabled;

use shortdeck_core::{Controller, Domain, DomainHealth, DomainRedirects, EditDomainRedirects};

use crate::cli::{DomainsArgs, DomainsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Base URL redirect")]
    base_url: String,
    #[tabled(rename = "404 redirect")]
    regular_404: String,
    #[tabled(rename = "Invalid short URL redirect")]
    invalid_short_url: String,
}

impl DomainRow {
    fn new(d: &Arc<Domain>, show_status: bool, color: bool) -> Self {
        let redirects = d.redirects.clone().unwrap_or_default();
        let or_dash = |v: Option<String>| v.unwrap_or_else(|| output::dash(color));
        Self {
            domain: d.domain.clone(),
            default: if d.is_default { "yes".into() } else { String::new() },
            status: if show_status {
                output::paint_status(d.status, color)
            } else {
                output::dash(color)
            },
            base_url: or_dash(redirects.base_url_redirect),
            regular_404: or_dash(redirects.regular_404_redirect),
            invalid_short_url: or_dash(redirects.invalid_short_url_redirect),
        }
    }
}

fn redirects_detail(edit: &EditDomainRedirects) -> String {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".into());
    [
        format!("Domain:                     {}", edit.domain),
        format!(
            "Base URL redirect:          {}",
            show(&edit.redirects.base_url_redirect)
        ),
        format!(
            "404 redirect:               {}",
            show(&edit.redirects.regular_404_redirect)
        ),
        format!(
            "Invalid short URL redirect: {}",
            show(&edit.redirects.invalid_short_url_redirect)
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DomainsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color());

    match args.command {
        DomainsCommand::List { filter, validate } => {
            controller.list_domains().await?;
            if validate {
                controller.validate_domains().await?;
            }
            if let Some(term) = filter {
                controller.filter_domains(term)?;
            }
            controller.settled().await?;

            let state = controller.domains().current();
            let out = output::render_list(
                &global.output(),
                &state.filtered_domains,
                |d| DomainRow::new(d, validate, color),
                |d| d.domain.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Check { domain } => {
            let status = controller.check_domain_health(&domain).await?;
            let health = DomainHealth { domain, status };
            let out = output::render_single(
                &global.output(),
                &health,
                |h| format!("{}: {}", h.domain, output::paint_status(h.status, color)),
                |h| h.status.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Redirects {
            domain,
            base_url,
            regular_404,
            invalid_short_url,
        } => {
            let edit = EditDomainRedirects {
                domain,
                redirects: DomainRedirects {
                    base_url_redirect: base_url,
                    regular_404_redirect: regular_404,
                    invalid_short_url_redirect: invalid_short_url,
                },
            };
            let saved = controller.edit_domain_redirects(edit).await?;
            let out = output::render_single(&global.output(), &saved, redirects_detail, |e| {
                e.domain.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
