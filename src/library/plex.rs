/// Plex Media Server library provider implementation.
use super::plex_types::{PlexMetadata, PlexMetadataContainer, PlexResponse, PlexSectionContainer};
use super::{LibraryError, LibraryProvider, LocalEpisode, Movie, Show};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Library provider for a Plex Media Server.
///
/// Requests go to the server's JSON API, authenticated with an
/// `X-Plex-Token` header.
pub struct PlexLibrary {
    client: Client,
    base_url: String,
    token: String,
}

impl PlexLibrary {
    /// Creates a provider for the server at `base_url`
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, LibraryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LibraryError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Performs a GET request and decodes the `MediaContainer` payload
    fn get<T>(&self, path: &str) -> Result<T, LibraryError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| LibraryError::Request(e.to_string()))?;

        if !response.status().is_success() {
            // The URL carries no token, it travels in a header
            return Err(LibraryError::Http {
                status: response.status().as_u16(),
                url,
            });
        }

        let body: PlexResponse<T> = response
            .json()
            .map_err(|e| LibraryError::Parse(e.to_string()))?;
        Ok(body.media_container)
    }

    /// Looks up the key of the section titled `title`
    fn section_key(&self, title: &str) -> Result<String, LibraryError> {
        let sections: PlexSectionContainer = self.get("/library/sections")?;
        find_section_key(sections, title)
    }

    fn section_items(&self, title: &str) -> Result<Vec<PlexMetadata>, LibraryError> {
        let key = self.section_key(title)?;
        let items: PlexMetadataContainer = self.get(&format!("/library/sections/{key}/all"))?;
        debug!(section = title, items = items.metadata.len(), "listed library section");
        Ok(items.metadata)
    }
}

fn find_section_key(sections: PlexSectionContainer, title: &str) -> Result<String, LibraryError> {
    sections
        .directories
        .into_iter()
        .find(|section| section.title == title)
        .map(|section| section.key)
        .ok_or_else(|| LibraryError::SectionNotFound(title.to_string()))
}

/// Converts a section entry to a show; entries without a key are unusable
fn convert_show(item: PlexMetadata) -> Option<Show> {
    Some(Show {
        key: item.rating_key?,
        name: item.title.unwrap_or_default(),
        year: item.year,
    })
}

fn convert_movie(item: PlexMetadata) -> Movie {
    let parts: Vec<_> = item
        .media
        .into_iter()
        .flat_map(|media| media.parts)
        .collect();

    Movie {
        title: item.title.unwrap_or_default(),
        year: item.year,
        parts: parts.len(),
        files: parts.into_iter().filter_map(|part| part.file).collect(),
    }
}

impl LibraryProvider for PlexLibrary {
    fn list_shows(&self, section: &str) -> Result<Vec<Show>, LibraryError> {
        Ok(self
            .section_items(section)?
            .into_iter()
            .filter_map(convert_show)
            .collect())
    }

    fn list_episodes(&self, show: &Show) -> Result<Vec<LocalEpisode>, LibraryError> {
        let leaves: PlexMetadataContainer =
            self.get(&format!("/library/metadata/{}/allLeaves", show.key))?;

        Ok(leaves
            .metadata
            .into_iter()
            .map(|episode| LocalEpisode {
                season_number: episode.parent_index,
                episode_number: episode.index,
            })
            .collect())
    }

    fn list_movies(&self, section: &str) -> Result<Vec<Movie>, LibraryError> {
        Ok(self
            .section_items(section)?
            .into_iter()
            .map(convert_movie)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: DeserializeOwned>(json: &str) -> T {
        serde_json::from_str::<PlexResponse<T>>(json)
            .unwrap()
            .media_container
    }

    #[test]
    fn test_find_section_key() {
        let sections: PlexSectionContainer = parse(
            r#"{"MediaContainer": {"size": 2, "Directory": [
                {"key": "1", "title": "Movies", "type": "movie"},
                {"key": "2", "title": "TV Shows", "type": "show"}
            ]}}"#,
        );

        assert_eq!(find_section_key(sections, "TV Shows").unwrap(), "2");
    }

    #[test]
    fn test_find_section_key_missing() {
        let sections: PlexSectionContainer = parse(r#"{"MediaContainer": {"size": 0}}"#);

        assert!(matches!(
            find_section_key(sections, "Anime"),
            Err(LibraryError::SectionNotFound(name)) if name == "Anime"
        ));
    }

    #[test]
    fn test_convert_shows() {
        let items: PlexMetadataContainer = parse(
            r#"{"MediaContainer": {"Metadata": [
                {"ratingKey": "100", "title": "The Wire", "year": 2002},
                {"ratingKey": "101", "title": "Undated"},
                {"title": "No Key"}
            ]}}"#,
        );

        let shows: Vec<Show> = items.metadata.into_iter().filter_map(convert_show).collect();

        assert_eq!(
            shows,
            vec![
                Show {
                    key: "100".to_string(),
                    name: "The Wire".to_string(),
                    year: Some(2002),
                },
                Show {
                    key: "101".to_string(),
                    name: "Undated".to_string(),
                    year: None,
                },
            ]
        );
    }

    #[test]
    fn test_convert_movie_collects_all_parts() {
        let items: PlexMetadataContainer = parse(
            r#"{"MediaContainer": {"Metadata": [
                {"ratingKey": "7", "title": "Heat", "year": 1995, "Media": [
                    {"Part": [{"file": "/movies/Heat (1995)/Heat.mkv"}]},
                    {"Part": [{"file": "/movies/Heat (1995)/Heat.1080p.mkv"}, {"key": "no-file"}]}
                ]}
            ]}}"#,
        );

        let movie = convert_movie(items.metadata.into_iter().next().unwrap());

        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.parts, 3);
        assert_eq!(
            movie.files,
            vec![
                "/movies/Heat (1995)/Heat.mkv".to_string(),
                "/movies/Heat (1995)/Heat.1080p.mkv".to_string(),
            ]
        );
    }

    #[test]
    fn test_episode_leaves_parse() {
        let leaves: PlexMetadataContainer = parse(
            r#"{"MediaContainer": {"Metadata": [
                {"ratingKey": "9", "title": "Pilot", "parentIndex": 1, "index": 1},
                {"ratingKey": "10", "title": "Unsorted"}
            ]}}"#,
        );

        assert_eq!(leaves.metadata[0].parent_index, Some(1));
        assert_eq!(leaves.metadata[0].index, Some(1));
        assert_eq!(leaves.metadata[1].parent_index, None);
    }
}
