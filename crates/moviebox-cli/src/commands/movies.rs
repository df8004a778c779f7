use crate::output::{table, Output};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviebox_client::{CatalogView, Moviebox, MovieControls, ReviewsView, SummaryState, SummaryView};
use moviebox_models::{CatalogEntry, CatalogFilter, ListMembership};
use owo_colors::OwoColorize;
use serde_json::json;

/// Find a movie by title in the catalog as the current session sees it.
pub async fn resolve(client: &Moviebox, title: &str) -> Result<CatalogEntry> {
    let view = CatalogView::new(client.movies.clone(), CatalogFilter::All);
    view.load().await?;
    view.find(title)
        .ok_or_else(|| eyre!("No movie titled \"{}\" in the catalog", title.trim()))
}

pub fn require_login(client: &Moviebox, action: &str) -> Result<()> {
    if client.session().is_authenticated() {
        Ok(())
    } else {
        Err(eyre!("Please login to {}", action))
    }
}

pub async fn run_movies(client: &Moviebox, filter: CatalogFilter, output: &Output) -> Result<()> {
    let view = CatalogView::new(client.movies.clone(), filter);
    view.load().await?;
    let state = view.snapshot();

    if let Some(message) = view.empty_message() {
        output.emit(&json!({ "filter": filter, "movies": [], "message": message }), || {
            println!("{}", message.dimmed())
        });
        return Ok(());
    }

    output.emit(&json!({ "filter": filter, "movies": state.entries }), || {
        let mut t = table(vec!["Title", "Released", "Rating", "Mine", "List"]);
        for entry in &state.entries {
            t.add_row(vec![
                entry.title().to_string(),
                entry.identity().release_date_label(),
                format!("{:.1}", entry.rating()),
                entry.user_rating().map(|r| r.to_string()).unwrap_or_default(),
                membership_label(entry.membership()),
            ]);
        }
        println!("{}", t);
    });
    Ok(())
}

pub async fn run_show(client: &Moviebox, title: &str, output: &Output) -> Result<()> {
    let entry = resolve(client, title).await?;
    let movie = entry.identity();

    let reviews = ReviewsView::new(client.reviews.clone(), movie.clone());
    if let Err(e) = reviews.load().await {
        tracing::warn!("Failed to load reviews for {}: {}", movie.title, e);
    }
    let reviews = reviews.snapshot();
    let summary = SummaryView::new(client.reviews.clone(), movie.clone()).load().await;

    output.emit(
        &json!({
            "movie": entry,
            "poster": entry.poster_path(),
            "reviews": reviews.reviews,
            "my_review": reviews.my_review,
            "summary": summary,
        }),
        || {
            println!("\n{} ({})", entry.title().bright_cyan().bold(), movie.release_date_label());
            println!("{}", entry.description());
            println!();
            println!("{} {}", "Director:".bold(), entry.director());
            println!("{} {}", "Starring:".bold(), entry.actors().join(", "));
            println!("{} {}", "Genres:".bold(), entry.genres().join(", "));
            println!("{} {:.1}/10", "Rating:".bold(), entry.rating());
            if client.session().is_authenticated() {
                let mine = entry.user_rating().map(|r| r.stars()).unwrap_or_else(|| "not rated".to_string());
                println!("{} {}", "Your rating:".bold(), mine);
                println!("{} {}", "Your list:".bold(), membership_label(entry.membership()));
            }
            println!();
            match &summary {
                SummaryState::Loaded(text) => println!("{}\n{}", "Summary".bold(), text),
                SummaryState::Empty => println!("{}", "No reviews yet to summarize".dimmed()),
                SummaryState::Failed(e) => println!("{} {}", "Summary unavailable:".yellow(), e),
                SummaryState::Idle | SummaryState::Loading => {}
            }
            println!("\n{} {}", "Reviews:".bold(), reviews.reviews.len());
            if let Some(error) = &reviews.error {
                println!("{} {}", "⚠".yellow(), error);
            }
        },
    );
    Ok(())
}

pub async fn run_rate(client: &Moviebox, title: &str, rating: i32, output: &Output) -> Result<()> {
    require_login(client, "rate movies")?;
    let entry = resolve(client, title).await?;
    let controls = MovieControls::from_entry(client.movies.clone(), &entry);

    let sent = controls.set_rating(rating).await?;
    if sent.value() as i32 != rating {
        output.warn(format!("Ratings are 1 to 10, saved {} instead of {}", sent.value(), rating));
    }
    output.success(format!("Rated {} {}", entry.title(), sent));
    Ok(())
}

pub async fn run_list(client: &Moviebox, title: &str, membership: ListMembership, output: &Output) -> Result<()> {
    require_login(client, "manage your lists")?;
    let entry = resolve(client, title).await?;
    let controls = MovieControls::from_entry(client.movies.clone(), &entry);

    controls.set_membership(membership).await?;
    if membership.is_listed() {
        output.success(format!("Added {} to your {}", entry.title(), membership));
    } else {
        output.success(format!("Removed {} from your lists", entry.title()));
    }
    Ok(())
}

fn membership_label(membership: ListMembership) -> String {
    match membership {
        ListMembership::Watchlist => "watchlist".to_string(),
        ListMembership::Favorite => "★ favorite".to_string(),
        ListMembership::None => String::new(),
    }
}
