//! Duplicate movie detection
//!
//! A movie counts as duplicated when the library holds more than one media
//! part for it, whether or not the server knows each part's path. File
//! contents are never compared.

use crate::library::Movie;

/// Keeps only the movies backed by more than one media part
pub fn find_duplicates(movies: Vec<Movie>) -> Vec<Movie> {
    movies.into_iter().filter(|movie| movie.parts > 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, files: &[&str]) -> Movie {
        Movie {
            title: title.to_string(),
            year: None,
            parts: files.len(),
            files: files.iter().map(|file| file.to_string()).collect(),
        }
    }

    #[test]
    fn test_find_duplicates() {
        let duplicates = find_duplicates(vec![
            movie("Alien", &["/m/Alien.mkv"]),
            movie("Aliens", &["/m/Aliens.mkv", "/m/Aliens (Special Edition).mkv"]),
            movie("Offline", &[]),
        ]);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].title, "Aliens");
        assert_eq!(duplicates[0].files.len(), 2);
    }

    #[test]
    fn test_parts_without_path_still_count() {
        let duplicates = find_duplicates(vec![
            Movie {
                parts: 2,
                ..movie("Heat", &["/m/Heat.mkv"])
            },
            Movie {
                parts: 1,
                ..movie("Ronin", &[])
            },
        ]);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].title, "Heat");
        assert_eq!(duplicates[0].files, vec!["/m/Heat.mkv".to_string()]);
    }
}
