//! Rich reply cards.
//!
//! An [`Embed`] mirrors what chat platforms render as a card: a title, an
//! optional link and image, a list of name/value fields and a footer.
//! Transports without native cards print [`Embed::render`] instead.

use reqwest::Url;

use crate::catalog::MovieInfo;
use crate::consts::MAX_LISTED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Embed {
    pub title: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub fields: Vec<Field>,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Append a field. Returns `false` (and drops it) once the card is full.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> bool {
        if self.is_full() {
            return false;
        }
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        true
    }

    pub fn is_full(&self) -> bool {
        self.fields.len() >= MAX_LISTED
    }

    /// Plain-text rendering for terminals and logs.
    pub fn render(&self) -> String {
        let mut out = format!("┌ {}\n", self.title);
        if let Some(url) = &self.url {
            out.push_str(&format!("│ {url}\n"));
        }
        if let Some(image) = &self.image_url {
            out.push_str(&format!("│ [image] {image}\n"));
        }

        let width = self
            .fields
            .iter()
            .map(|f| f.name.chars().count())
            .max()
            .unwrap_or(0);
        for field in &self.fields {
            out.push_str(&format!("│ {:<width$}  {}\n", field.name, field.value));
        }

        if let Some(footer) = &self.footer {
            out.push_str(&format!("└ {footer}\n"));
        } else {
            out.push_str("└\n");
        }
        out
    }
}

/// Full card for a catalog title.
pub fn movie_card(movie: &MovieInfo) -> Embed {
    let mut card = Embed::new(&movie.title)
        .with_url(movie.page_url())
        .with_footer(movie.page_url());
    if let Some(poster) = movie.poster_url.as_deref().filter(|p| is_absolute_url(p)) {
        card = card.with_image_url(poster);
    }

    let fields = [
        ("Genre", &movie.genre, false),
        ("Rating", &movie.rating, true),
        ("Directors", &movie.director, true),
        ("Writer", &movie.writer, true),
        ("Year", &movie.year, true),
        ("Plot", &movie.plot, false),
    ];
    for (name, value, inline) in fields {
        if let Some(value) = value {
            card.add_field(name, value, inline);
        }
    }
    card
}

/// Compact card attached to vote confirmations.
pub fn movie_card_lite(movie: &MovieInfo) -> Embed {
    let mut card = Embed::new(&movie.title).with_url(movie.page_url());
    if let Some(year) = &movie.year {
        card.add_field("Year", year, true);
    }
    if let Some(rating) = &movie.rating {
        card.add_field("Rating", rating, true);
    }
    card
}

/// Card shown when a search comes back empty.
pub fn not_found_card() -> Embed {
    Embed::new("Movie not found")
}

fn is_absolute_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|u| u.has_host())
}
