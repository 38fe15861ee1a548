use std::io::{self, Write};

use marquee_core::HydratedFavorite;
use marquee_core::model::{MovieDetail, MovieSummary, PersonDetail, UserProfile};

const MAX_CAST: usize = 10;

/// `Title (Year)  *8.1  Drama, Crime`
pub fn movie_line(movie: &MovieSummary) -> String {
    let mut line = movie.display_title();
    if let Some(rate) = movie.rate.as_deref().filter(|r| !r.is_empty()) {
        line.push_str(&format!("  *{rate}"));
    }
    if !movie.genres.is_empty() {
        line.push_str(&format!("  {}", movie.genres.join(", ")));
    }
    line
}

/// Drop inline markup from plot text.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn field(out: &mut impl Write, label: &str, value: Option<&str>) -> io::Result<()> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => writeln!(out, "{label:<14}{value}"),
        None => Ok(()),
    }
}

pub fn movie(out: &mut impl Write, movie: &MovieDetail) -> io::Result<()> {
    writeln!(out, "{}", movie.full_title.as_deref().unwrap_or(&movie.title))?;
    field(out, "Year", movie.year.as_deref())?;
    field(out, "Runtime", movie.runtime.as_deref())?;
    if !movie.genres.is_empty() {
        field(out, "Genres", Some(&movie.genres.join(", ")))?;
    }
    if !movie.directors.is_empty() {
        let names: Vec<&str> =
            movie.directors.iter().map(|d| d.name.as_str()).collect();
        field(out, "Directed by", Some(&names.join(", ")))?;
    }
    field(out, "Countries", Some(&movie.countries.join(", ")))?;
    field(out, "Languages", Some(&movie.languages.join(", ")))?;
    field(out, "Awards", movie.awards.as_deref())?;

    if let Some(ratings) = &movie.ratings {
        for (label, value) in ratings.entries() {
            field(out, label, Some(value))?;
        }
    }
    if let Some(box_office) = &movie.box_office {
        for (label, value) in box_office.entries() {
            field(out, label, Some(value))?;
        }
    }

    if let Some(plot) = movie.plot_full.as_deref() {
        writeln!(out, "\n{}", strip_tags(plot))?;
    }

    if !movie.actors.is_empty() {
        writeln!(out, "\nCast")?;
        for actor in movie.actors.iter().take(MAX_CAST) {
            match actor.character.as_deref() {
                Some(character) => {
                    writeln!(out, "  {} as {}  [{}]", actor.name, character, actor.id)?
                }
                None => writeln!(out, "  {}  [{}]", actor.name, actor.id)?,
            }
        }
    }

    if !movie.reviews.is_empty() {
        writeln!(out, "\nReviews ({})", movie.reviews.len())?;
        for review in &movie.reviews {
            let who = review.user.as_deref().unwrap_or("anonymous");
            let rate = review.rate.as_deref().map(|r| format!(" *{r}")).unwrap_or_default();
            writeln!(out, "  {who}{rate}: {}", review.title.as_deref().unwrap_or(""))?;
        }
    }

    if !movie.similar_movies.is_empty() {
        writeln!(out, "\nSimilar")?;
        for similar in &movie.similar_movies {
            writeln!(out, "  {}  [{}]", movie_line(similar), similar.id)?;
        }
    }
    Ok(())
}

pub fn person(out: &mut impl Write, person: &PersonDetail) -> io::Result<()> {
    writeln!(out, "{}", person.name)?;
    field(out, "Role", person.role.as_deref())?;
    field(out, "Born", person.birth_date_display().as_deref())?;
    field(out, "Died", person.death_date_display().as_deref())?;
    field(out, "Height", person.height.as_deref())?;
    field(out, "Awards", person.awards.as_deref())?;
    if let Some(summary) = person.summary.as_deref() {
        writeln!(out, "\n{}", strip_tags(summary))?;
    }
    if !person.known_for.is_empty() {
        writeln!(out, "\nKnown for")?;
        for movie in &person.known_for {
            let credit = movie
                .character
                .as_deref()
                .or(movie.role.as_deref())
                .map(|c| format!(" ({c})"))
                .unwrap_or_default();
            writeln!(out, "  {}{credit}  [{}]", movie_line(movie), movie.id)?;
        }
    }
    Ok(())
}

pub fn profile(out: &mut impl Write, profile: &UserProfile) -> io::Result<()> {
    writeln!(out, "[{}] {}", profile.initials(), profile.username)?;
    field(out, "Email", Some(&profile.email))?;
    field(out, "Role", profile.role.as_deref())?;
    writeln!(out, "{:<14}{}", "Phone", profile.phone.as_deref().unwrap_or("-"))?;
    writeln!(out, "{:<14}{}", "Date of birth", profile.dob.as_deref().unwrap_or("-"))?;
    Ok(())
}

pub fn favorites(
    out: &mut impl Write,
    favorites: &[HydratedFavorite],
) -> io::Result<()> {
    writeln!(out, "My Favorites ({})", favorites.len())?;
    for (i, favorite) in favorites.iter().enumerate() {
        let summary = favorite.summary();
        let runtime = favorite
            .detail()
            .and_then(|d| d.runtime.as_deref())
            .map(|r| format!("  {r}"))
            .unwrap_or_default();
        writeln!(
            out,
            "{:>4}. {}{runtime}  [{}]",
            i + 1,
            movie_line(&summary),
            summary.id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use marquee_core::model::MovieId;

    use super::*;

    #[test]
    fn movie_line_skips_missing_parts() {
        let mut movie =
            MovieSummary::new(MovieId::from_string("tt1").unwrap(), "Heat");
        assert_eq!(movie_line(&movie), "Heat");

        movie.year = Some("1995".into());
        movie.rate = Some("8.3".into());
        movie.genres = vec!["Crime".into(), "Drama".into()];
        assert_eq!(movie_line(&movie), "Heat (1995)  *8.3  Crime, Drama");
    }

    #[test]
    fn strips_inline_markup() {
        assert_eq!(
            strip_tags("A <b>bold</b>\n plot<br/>with  breaks"),
            "A bold plotwith breaks"
        );
    }

    #[test]
    fn profile_fills_blanks() {
        let profile = UserProfile {
            username: "trinity".into(),
            email: "trinity@example.com".into(),
            role: None,
            phone: None,
            dob: None,
        };
        let mut out = Vec::new();
        super::profile(&mut out, &profile).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[TR] trinity\n"));
        assert!(text.contains("Phone         -"));
    }
}
