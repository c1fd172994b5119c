//! Link command handlers.

use chrono::Utc;
use tabled::Tabled;

use snaplink_core::format::{
    click_label, format_count, format_date, relative_time, truncate_text, updated_label,
};
use snaplink_core::{Client, CreateLinkForm, Dashboard, EditLinkForm, Link, LinkStats, ListQuery};

use crate::cli::{GlobalOpts, LinksArgs, LinksCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

const URL_COLUMN_WIDTH: usize = 48;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Short URL")]
    short_url: String,
    #[tabled(rename = "Original URL")]
    original_url: String,
    #[tabled(rename = "Clicks")]
    clicks: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn short_url(client: &Client, code: &str) -> String {
    client
        .links()
        .short_url(code)
        .map_or_else(|_| code.to_owned(), |u| u.to_string())
}

fn link_row(client: &Client, link: &Link) -> LinkRow {
    let now = Utc::now();
    LinkRow {
        id: link.id.to_string(),
        code: link.short_code.clone(),
        short_url: short_url(client, &link.short_code),
        original_url: truncate_text(&link.original_url, URL_COLUMN_WIDTH, "..."),
        clicks: format_count(link.click_count),
        created: relative_time(&link.created_at, &now),
        updated: updated_label(&link.created_at, &link.updated_at, &now),
    }
}

fn link_detail(client: &Client, link: &Link) -> String {
    output::detail_lines(&[
        ("ID", link.id.to_string()),
        ("Short URL", short_url(client, &link.short_code)),
        ("Original URL", link.original_url.clone()),
        ("Clicks", click_label(link.click_count)),
        ("Created", format_date(&link.created_at)),
        ("Updated", format_date(&link.updated_at)),
    ])
}

fn stats_detail(stats: &LinkStats) -> String {
    let mut pairs = Vec::new();
    if let Some(ref id) = stats.id {
        pairs.push(("ID", id.to_string()));
    }
    if let Some(ref code) = stats.short_code {
        pairs.push(("Code", code.clone()));
    }
    if let Some(ref url) = stats.original_url {
        pairs.push(("Original URL", url.clone()));
    }
    if let Some(clicks) = stats.click_count {
        pairs.push(("Clicks", format_count(clicks)));
    }
    if let Some(ref created) = stats.created_at {
        pairs.push(("Created", format_date(created)));
    }
    for (key, value) in &stats.extra {
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.push((key.as_str(), rendered));
    }
    output::detail_lines(&pairs)
}

fn print_link(client: &Client, link: &Link, global: &GlobalOpts) {
    let out = output::render_single(
        global.output(),
        link,
        |l| link_detail(client, l),
        |l| short_url(client, &l.short_code),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &Client, args: LinksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // `url` is pure string joining and works signed out
    if let LinksCommand::Url { code } = &args.command {
        let url = client.links().short_url(code.trim())?;
        output::print_output(url.as_str(), global.quiet);
        return Ok(());
    }

    util::require_session(client)?;
    let dashboard = client.dashboard();
    let result = run(client, &dashboard, args.command, global).await;
    dashboard.close();
    result
}

async fn run(
    client: &Client,
    dashboard: &Dashboard,
    command: LinksCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        LinksCommand::List { search, sort, order } => {
            util::with_spinner(global, "Loading links", dashboard.load()).await?;
            dashboard.set_query(ListQuery {
                search_term: search.unwrap_or_default(),
                sort_key: sort,
                sort_order: order,
            });
            let visible = dashboard.visible();
            if visible.is_empty() && global.output() == OutputFormat::Table {
                output::print_notice("No links found", global);
                return Ok(());
            }
            let out = output::render_list(
                global.output(),
                visible.as_slice(),
                |l| link_row(client, l),
                |l| l.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LinksCommand::Create { url, code } => {
            let mut form = CreateLinkForm::new(url, code.unwrap_or_default());
            let link = util::with_spinner(global, "Creating link", dashboard.create(&mut form)).await?;
            print_link(client, &link, global);
            output::print_success(&format!("Created {}", short_url(client, &link.short_code)), global);
            Ok(())
        }

        LinksCommand::Edit { id, url, code } => {
            let id = util::link_id(&id)?;
            util::with_spinner(global, "Loading links", dashboard.load()).await?;
            let current = dashboard
                .state()
                .links
                .iter()
                .find(|l| l.id == id)
                .cloned()
                .ok_or_else(|| CliError::NotFound {
                    message: format!("No link with ID {id}"),
                })?;

            let mut form = EditLinkForm::from_link(&current);
            if let Some(url) = url {
                form.original_url = url;
            }
            if let Some(code) = code {
                form.short_code = code;
            }

            match util::with_spinner(global, "Updating link", dashboard.update(&id, &form)).await? {
                Some(link) => {
                    print_link(client, &link, global);
                    output::print_success(&format!("Updated link {id}"), global);
                }
                None => output::print_notice("No changes", global),
            }
            Ok(())
        }

        LinksCommand::Delete { id } => {
            let id = util::link_id(&id)?;
            let confirmed = util::confirm(&format!("Delete link {id}?"), "delete a link", global.yes)?;
            if util::with_spinner(global, "Deleting link", dashboard.delete(&id, confirmed)).await? {
                output::print_success(&format!("Deleted link {id}"), global);
            } else {
                output::print_notice("Cancelled", global);
            }
            Ok(())
        }

        LinksCommand::Stats { id } => {
            let id = util::link_id(&id)?;
            let stats = util::with_spinner(global, "Fetching stats", client.links().get_link_stats(&id)).await?;
            let out = output::render_single(global.output(), &stats, stats_detail, |s| {
                s.click_count.unwrap_or_default().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // answered in `handle` before a session is required
        LinksCommand::Url { .. } => Ok(()),
    }
}
