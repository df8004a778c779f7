use super::movies::{require_login, resolve};
use super::prompts::{or_prompt, prompt_yes_no};
use crate::output::{table, Output};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviebox_client::{Moviebox, ReviewsView, SummaryState, SummaryView};
use owo_colors::OwoColorize;
use serde_json::json;

/// Reviews are long; keep table cells readable.
const PREVIEW_CHARS: usize = 60;

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

pub async fn run_review_get(client: &Moviebox, title: &str, output: &Output) -> Result<()> {
    require_login(client, "see your review")?;
    let entry = resolve(client, title).await?;

    let mine = client.reviews.get_my_review(&entry.identity()).await?;
    output.emit(&json!({ "movie": entry.title(), "review": &mine }), || match &mine {
        Some(review) => {
            println!("{} {}-{:02}-{:02}", "Written".dimmed(), review.review_year, review.review_month, review.review_day);
            println!("{}", review.text);
        }
        None => println!("You haven't reviewed {} yet", entry.title()),
    });
    Ok(())
}

pub async fn run_review_save(client: &Moviebox, title: &str, text: Option<String>, output: &Output) -> Result<()> {
    require_login(client, "write reviews")?;
    let entry = resolve(client, title).await?;
    let text = or_prompt(text, "Review")?;

    let view = ReviewsView::new(client.reviews.clone(), entry.identity());
    view.save(&text).await?;
    output.success(format!("Saved your review of {}", entry.title()));
    if let Some(error) = view.snapshot().error {
        output.warn(format!("Could not reload reviews: {}", error));
    }
    Ok(())
}

pub async fn run_review_delete(client: &Moviebox, title: &str, yes: bool, output: &Output) -> Result<()> {
    require_login(client, "delete reviews")?;
    let entry = resolve(client, title).await?;

    if !yes && !prompt_yes_no(&format!("Delete your review of {}?", entry.title()), false)? {
        output.info("Cancelled");
        return Ok(());
    }

    let view = ReviewsView::new(client.reviews.clone(), entry.identity());
    view.delete().await?;
    output.success(format!("Deleted your review of {}", entry.title()));
    if let Some(error) = view.snapshot().error {
        output.warn(format!("Could not reload reviews: {}", error));
    }
    Ok(())
}

pub async fn run_reviews(client: &Moviebox, title: &str, output: &Output) -> Result<()> {
    let entry = resolve(client, title).await?;
    let view = ReviewsView::new(client.reviews.clone(), entry.identity());
    view.load().await?;
    let state = view.snapshot();

    output.emit(&json!({ "movie": entry.title(), "reviews": &state.reviews, "my_review": &state.my_review }), || {
        if state.reviews.is_empty() {
            println!("{}", "No reviews yet".dimmed());
            return;
        }
        let mut t = table(vec!["ID", "Author", "Date", "Rating", "Likes", "Review"]);
        for review in &state.reviews {
            let likes = if review.is_liked {
                format!("♥ {}", review.likes)
            } else {
                review.likes.to_string()
            };
            t.add_row(vec![
                review.id.clone(),
                review.username.clone(),
                review.written_on().map(|d| d.to_string()).unwrap_or_default(),
                review.author_rating().map(|r| r.to_string()).unwrap_or_default(),
                likes,
                preview(&review.text),
            ]);
        }
        println!("{}", t);
    });
    Ok(())
}

pub async fn run_like(client: &Moviebox, title: &str, review_id: &str, output: &Output) -> Result<()> {
    let entry = resolve(client, title).await?;
    let view = ReviewsView::new(client.reviews.clone(), entry.identity());
    view.load().await?;

    let liked = view.toggle_like(review_id).await?;
    let likes = view
        .snapshot()
        .reviews
        .iter()
        .find(|r| r.id == review_id)
        .map(|r| r.likes)
        .unwrap_or_default();
    output.emit(&json!({ "review_id": review_id, "liked": liked, "likes": likes }), || {
        let verb = if liked { "Liked" } else { "Unliked" };
        println!("{} {} review {} ({} likes)", "✓".green(), verb, review_id, likes);
    });
    Ok(())
}

pub async fn run_summary(client: &Moviebox, title: &str, output: &Output) -> Result<()> {
    let entry = resolve(client, title).await?;
    let state = SummaryView::new(client.reviews.clone(), entry.identity()).load().await;

    match &state {
        SummaryState::Failed(e) => Err(eyre!("Failed to load summary: {}", e)),
        _ => {
            output.emit(&json!({ "movie": entry.title(), "summary": &state }), || match &state {
                SummaryState::Loaded(text) => println!("{}", text),
                _ => println!("{}", "No reviews yet to summarize".dimmed()),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_text() {
        assert_eq!(preview("short"), "short");
        let long = "a".repeat(PREVIEW_CHARS + 5);
        let shown = preview(&long);
        assert!(shown.ends_with('…'));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 1);
    }
}
