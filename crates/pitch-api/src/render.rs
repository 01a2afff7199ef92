//! HTML templates. Every dynamic value goes through maud's escaping except
//! the pitch body, which is already-rendered markdown.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use pitch_types::models::Startup;

use crate::middleware::RequestContext;

pub const EMPTY_RESULTS: &str = "No startups found";
pub const EMPTY_PITCH: &str = "No details provided";
pub const NOT_FOUND: &str = "Startup not found";

fn display_date(startup: &Startup) -> String {
    startup.created_at.format("%B %-d, %Y").to_string()
}

fn layout(ctx: &RequestContext, title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Pitchdeck" }
                link rel="stylesheet" href="/static/app.css";
            }
            body {
                (navbar(ctx))
                main { (body) }
            }
        }
    }
}

fn navbar(ctx: &RequestContext) -> Markup {
    html! {
        header.navbar {
            nav {
                a.logo href="/" { "Pitchdeck" }
                div.nav-actions {
                    @if let Some(session) = &ctx.session {
                        a href="/create" { "Create" }
                        form method="post" action="/auth/signout" {
                            button type="submit" { "Logout" }
                        }
                        @if let Some(id) = session.id {
                            a.nav-user href={ "/user/" (id.to_string()) } { (session.name) }
                        } @else {
                            span.nav-user { (session.name) }
                        }
                    } @else {
                        a.login href="/auth/signin" { "Login" }
                    }
                }
            }
        }
    }
}

fn search_form(query: Option<&str>) -> Markup {
    html! {
        form.search-form action="/" method="get" {
            input.search-input name="query" value=[query] placeholder="Search Startups";
            div.search-actions {
                @if query.is_some() {
                    a.search-reset href="/" title="Reset search" { "×" }
                }
                button.search-btn type="submit" { "Search" }
            }
        }
    }
}

fn startup_card(startup: &Startup) -> Markup {
    html! {
        li.startup-card {
            div.card-meta {
                span.card-date { (display_date(startup)) }
                span.card-views { (startup.views) " views" }
            }
            div.card-author {
                a href={ "/user/" (startup.author.id.to_string()) } { (startup.author.name) }
            }
            a.card-title href={ "/startup/" (startup.id.to_string()) } {
                h3 { (startup.title) }
            }
            p.card-description { (startup.description) }
            img.card-image src=(startup.image) alt=(startup.title);
            div.card-footer {
                a.card-category href={ "/?query=" (urlencoding::encode(&startup.category).into_owned()) } { (startup.category) }
                a.card-details href={ "/startup/" (startup.id.to_string()) } { "Details" }
            }
        }
    }
}

pub fn home_page(ctx: &RequestContext, query: Option<&str>, startups: &[Startup]) -> Markup {
    layout(
        ctx,
        "Startups",
        html! {
            section.hero {
                h1.heading { "Pitch Your Startup, " br; "Connect with Entrepreneurs" }
                p.sub-heading { "Submit Ideas, Vote on Pitches, and Get Noticed in Virtual Competitions." }
                (search_form(query))
            }
            section.listing {
                p.listing-title {
                    @if let Some(q) = query {
                        "Search results for \"" (q) "\""
                    } @else {
                        "All Startups"
                    }
                }
                @if startups.is_empty() {
                    p.no-results { (EMPTY_RESULTS) }
                } @else {
                    ul.card-grid {
                        @for startup in startups {
                            (startup_card(startup))
                        }
                    }
                }
            }
        },
    )
}

/// `pitch_html` is the rendered markdown; `None` shows the empty-pitch marker.
/// The editor picks section is left out entirely when `picks` is empty.
pub fn detail_page(ctx: &RequestContext, startup: &Startup, pitch_html: Option<&str>, picks: &[Startup]) -> Markup {
    layout(
        ctx,
        &startup.title,
        html! {
            section.detail-hero {
                p.tag { (display_date(startup)) }
                h1.heading { (startup.title) }
                p.sub-heading { (startup.description) }
            }
            section.detail {
                img.detail-image src=(startup.image) alt=(startup.title);
                div.detail-head {
                    a.author href={ "/user/" (startup.author.id.to_string()) } {
                        @if let Some(avatar) = &startup.author.image {
                            img.avatar src=(avatar) alt=(startup.author.name);
                        }
                        span.author-name { (startup.author.name) }
                        span.author-username { "@" (startup.author.username) }
                    }
                    span.category { (startup.category) }
                }
                h3 { "Pitch Details" }
                @if let Some(pitch) = pitch_html {
                    article.pitch { (PreEscaped(pitch)) }
                } @else {
                    p.no-result { (EMPTY_PITCH) }
                }
            }
            @if !picks.is_empty() {
                hr;
                section.editor-picks {
                    p.picks-title { "Editor Picks" }
                    ul.card-grid {
                        @for pick in picks {
                            (startup_card(pick))
                        }
                    }
                }
            }
            div.view-counter {
                span { "Views: " (startup.views) }
            }
        },
    )
}

pub fn not_found_page(ctx: &RequestContext) -> Markup {
    layout(
        ctx,
        NOT_FOUND,
        html! {
            h1.heading { (NOT_FOUND) }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pitch_types::api::Session;
    use pitch_types::models::AuthorSummary;
    use uuid::Uuid;

    fn startup(title: &str) -> Startup {
        Startup {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: "slug".into(),
            category: "Energy".into(),
            description: "Airborne <wind> power".into(),
            image: "https://img.example/kite.png".into(),
            pitch: None,
            views: 3,
            created_at: Utc::now(),
            author: AuthorSummary {
                id: Uuid::new_v4(),
                username: "ada".into(),
                name: "Ada".into(),
                image: None,
            },
        }
    }

    #[test]
    fn dynamic_text_is_escaped() {
        let page = home_page(&RequestContext::default(), Some("<b>"), &[startup("Kites")]).into_string();
        assert!(page.contains("Airborne &lt;wind&gt; power"));
        assert!(page.contains("Search results for &quot;&lt;b&gt;&quot;"));
        assert!(!page.contains("<b>"));
    }

    #[test]
    fn category_link_is_percent_encoded() {
        let mut card = startup("Lab");
        card.category = "R&D #1".into();
        let page = home_page(&RequestContext::default(), None, &[card]).into_string();
        assert!(page.contains(r#"href="/?query=R%26D%20%231""#));
        assert!(page.contains(">R&amp;D #1</a>"));
    }

    #[test]
    fn navbar_reflects_session() {
        let anon = home_page(&RequestContext::default(), None, &[]).into_string();
        assert!(anon.contains(r#"href="/auth/signin""#));
        assert!(!anon.contains("Logout"));

        let id = Uuid::new_v4();
        let ctx = RequestContext {
            session: Some(Session {
                id: Some(id),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                image: None,
            }),
        };
        let signed_in = home_page(&ctx, None, &[]).into_string();
        assert!(signed_in.contains("Logout"));
        assert!(signed_in.contains(&format!("/user/{id}")));
    }

    #[test]
    fn empty_listing_shows_marker() {
        let page = home_page(&RequestContext::default(), None, &[]).into_string();
        assert!(page.contains(EMPTY_RESULTS));
        assert!(page.contains("All Startups"));
    }
}
