use crate::client::MovieSource;
use crate::error::Result;
use crate::models::{MovieCollection, MovieRecord};

/// Collects up to `limit` movies released in `year`, walking the discover
/// pages in popularity order. With `with_details` every kept movie costs one
/// extra detail request.
pub fn fetch_movies<S: MovieSource + ?Sized>(
    source: &S,
    year: u16,
    limit: usize,
    with_details: bool,
) -> Result<MovieCollection> {
    let mut movies: MovieCollection = Vec::with_capacity(limit.min(1_000));
    let mut page_num = 1;

    while movies.len() < limit {
        let page = source.discover(year, page_num)?;
        log::info!(
            "Fetched discover page {}/{} for {} ({} results)",
            page_num,
            page.total_pages,
            year,
            page.results.len()
        );

        if page.results.is_empty() {
            break;
        }

        // Items past the limit would be truncated anyway, so skip their detail calls
        let remaining = limit - movies.len();
        for item in page.results.into_iter().take(remaining) {
            let mut record = MovieRecord::from_summary(item);
            if with_details {
                let details = source.details(record.id)?;
                record = record.with_details(details);
                log::debug!("Enriched '{}' (budget {}, revenue {})", record.title, record.budget, record.revenue);
            }
            movies.push(record);
        }

        if page_num >= page.total_pages {
            break;
        }
        page_num += 1;
    }

    log::info!("Collected {} movies for {}", movies.len(), year);
    Ok(movies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::models::{DiscoverItem, DiscoverPage, MovieDetails};
    use std::cell::RefCell;

    struct PagedSource {
        per_page: usize,
        total_pages: u32,
        discover_calls: RefCell<Vec<u32>>,
        detail_calls: RefCell<Vec<u64>>,
    }

    impl PagedSource {
        fn new(per_page: usize, total_pages: u32) -> Self {
            PagedSource {
                per_page,
                total_pages,
                discover_calls: RefCell::new(Vec::new()),
                detail_calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl MovieSource for PagedSource {
        fn discover(&self, _year: u16, page: u32) -> Result<DiscoverPage> {
            self.discover_calls.borrow_mut().push(page);
            let start = (page as usize - 1) * self.per_page;
            let results = (start..start + self.per_page)
                .map(|i| DiscoverItem {
                    id: i as u64,
                    title: format!("Movie {}", i),
                    vote_average: 5.0,
                    popularity: 100.0 - i as f64,
                    original_language: "en".to_string(),
                })
                .collect();
            Ok(DiscoverPage {
                page,
                total_pages: self.total_pages,
                total_results: self.total_pages * self.per_page as u32,
                results,
            })
        }

        fn details(&self, movie_id: u64) -> Result<MovieDetails> {
            self.detail_calls.borrow_mut().push(movie_id);
            Ok(MovieDetails {
                budget: Some(movie_id * 10),
                revenue: None,
                runtime: Some(90),
            })
        }
    }

    #[test]
    fn stops_at_page_exhaustion_before_limit() {
        let source = PagedSource::new(20, 5);
        let movies = fetch_movies(&source, 2023, 250, false).unwrap();

        assert_eq!(movies.len(), 100);
        assert_eq!(*source.discover_calls.borrow(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn truncates_to_limit_and_stops_paging() {
        let source = PagedSource::new(20, 5);
        let movies = fetch_movies(&source, 2023, 30, true).unwrap();

        assert_eq!(movies.len(), 30);
        assert_eq!(*source.discover_calls.borrow(), vec![1, 2]);
        assert_eq!(source.detail_calls.borrow().len(), 30);
        assert_eq!(movies[29].id, 29);
    }

    #[test]
    fn keeps_discovery_order_and_defaults_missing_details() {
        let source = PagedSource::new(3, 2);
        let movies = fetch_movies(&source, 2020, 10, true).unwrap();

        let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(movies[4].budget, 40);
        assert_eq!(movies[4].revenue, 0);
        assert!(movies.iter().all(|m| m.enriched && m.runtime == 90));
    }

    #[test]
    fn without_details_no_detail_calls_are_made() {
        let source = PagedSource::new(5, 1);
        let movies = fetch_movies(&source, 2020, 5, false).unwrap();

        assert!(source.detail_calls.borrow().is_empty());
        assert!(movies.iter().all(|m| !m.enriched && m.budget == 0));
    }

    #[test]
    fn zero_limit_makes_no_requests() {
        let source = PagedSource::new(5, 3);
        let movies = fetch_movies(&source, 2020, 0, true).unwrap();

        assert!(movies.is_empty());
        assert!(source.discover_calls.borrow().is_empty());
    }

    #[test]
    fn empty_first_page_ends_the_walk() {
        let source = PagedSource::new(0, 0);
        let movies = fetch_movies(&source, 1890, 100, true).unwrap();

        assert!(movies.is_empty());
        assert_eq!(*source.discover_calls.borrow(), vec![1]);
    }

    struct FailingSource;

    impl MovieSource for FailingSource {
        fn discover(&self, _year: u16, _page: u32) -> Result<DiscoverPage> {
            Err(AnalyzerError::Status {
                url: "http://example.test/discover/movie".to_string(),
                status: 401,
            })
        }

        fn details(&self, _movie_id: u64) -> Result<MovieDetails> {
            unreachable!("no details without a discover page")
        }
    }

    #[test]
    fn transport_errors_propagate() {
        let err = fetch_movies(&FailingSource, 2020, 10, true).unwrap_err();
        assert!(matches!(err, AnalyzerError::Status { status: 401, .. }));
    }
}
