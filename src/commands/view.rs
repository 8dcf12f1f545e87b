use async_trait::async_trait;

use super::{Command, CommandContext, CommandError};
use crate::chat::Reply;
use crate::embed::Embed;

pub struct ViewCommand;

#[async_trait]
impl Command for ViewCommand {
    fn name(&self) -> &str {
        "view"
    }

    fn description(&self) -> &str {
        "show the movies and their vote counts"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
        let standings = ctx.engine.view()?;
        if standings.is_empty() {
            return Ok(Reply::text("There are no movies"));
        }

        let mut card = Embed::new("Movie List");
        for movie in &standings.entries {
            card.add_field(&movie.title, movie.vote_count.to_string(), false);
        }
        let shown = card.fields.len();
        if standings.total > shown {
            card = card.with_footer(format!("showing {shown} of {} movies", standings.total));
        }
        Ok(Reply::card(card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Lookup, MovieInfo};
    use crate::chat::Author;
    use crate::commands::tests::Fixture;
    use crate::consts::MAX_LISTED;

    #[tokio::test]
    async fn empty_list_says_so() {
        let fx = Fixture::new();
        let author = Author::member("u1", "u1");
        let reply = ViewCommand.execute(&fx.ctx(&author, "")).await.unwrap();
        assert_eq!(reply.content, "There are no movies");
    }

    #[tokio::test]
    async fn lists_movies_by_votes() {
        let fx = Fixture::new();
        let heat = Lookup::Found(MovieInfo::new("tt0113277", "Heat"));
        let inception = Lookup::Found(MovieInfo::new("tt1375666", "Inception"));
        fx.engine.vote("a", &inception).unwrap();
        fx.engine.vote("b", &heat).unwrap();
        fx.engine.vote("c", &heat).unwrap();

        let author = Author::member("u1", "u1");
        let card = ViewCommand.execute(&fx.ctx(&author, "")).await.unwrap().embed.unwrap();
        assert_eq!(card.title, "Movie List");
        assert_eq!(card.fields[0].name, "Heat");
        assert_eq!(card.fields[0].value, "2");
        assert_eq!(card.fields[1].name, "Inception");
        assert_eq!(card.fields[1].value, "1");
        assert!(card.footer.is_none());
    }

    #[tokio::test]
    async fn overflow_notes_total_in_footer() {
        let fx = Fixture::new();
        for i in 0..MAX_LISTED + 2 {
            let movie = Lookup::Found(MovieInfo::new(format!("tt{i}"), format!("Movie {i}")));
            fx.engine.vote(&format!("u{i}"), &movie).unwrap();
        }
        let author = Author::member("u1", "u1");
        let card = ViewCommand.execute(&fx.ctx(&author, "")).await.unwrap().embed.unwrap();
        assert_eq!(card.fields.len(), MAX_LISTED);
        assert_eq!(
            card.footer.as_deref(),
            Some(format!("showing {MAX_LISTED} of {} movies", MAX_LISTED + 2).as_str())
        );
    }
}
