//! Reader for the plain-text instance format.
//!
//! ```text
//! V E R C X                  videos, endpoints, request lines, caches, cache size
//! s_0 s_1 ... s_{V-1}        video sizes
//! L_D K                      per endpoint: origin latency, reachable caches
//! c L_c                      K lines: cache id, latency
//! v e n                      R lines: video, endpoint, request count
//! ```

use std::str::FromStr;

use super::types::{CacheId, Endpoint, EndpointId, Instance, Request, VideoId};
use crate::error::ParseError;

/// Largest cache count accepted in a header.
///
/// Caches take no lines of their own, so their count cannot be checked
/// against the input length the way other sections are.
pub const MAX_CACHES: usize = 1 << 20;

/// Line cursor that tracks 1-based line numbers for error reporting.
struct Cursor<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            line: 0,
        }
    }

    /// Reads the next line as exactly `n` integers (`None` = any count).
    fn fields(&mut self, n: Option<usize>, expected: &'static str) -> Result<Vec<u64>, ParseError> {
        let (idx, text) = self.lines.next().ok_or(ParseError::UnexpectedEof {
            line: self.line + 1,
            expected,
        })?;
        self.line = idx + 1;

        let values = text
            .split_whitespace()
            .map(|tok| {
                tok.parse::<u64>().map_err(|_| ParseError::InvalidNumber {
                    line: self.line,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(n) = n {
            if values.len() != n {
                return Err(ParseError::FieldCount {
                    line: self.line,
                    expected: n,
                    found: values.len(),
                });
            }
        }
        Ok(values)
    }

    fn id(&self, value: u64, count: usize, kind: &'static str) -> Result<usize, ParseError> {
        match usize::try_from(value) {
            Ok(id) if id < count => Ok(id),
            _ => Err(ParseError::IdOutOfRange {
                line: self.line,
                kind,
                id: usize::try_from(value).unwrap_or(usize::MAX),
                count,
            }),
        }
    }

    fn count(&self, value: u64) -> Result<usize, ParseError> {
        usize::try_from(value).map_err(|_| ParseError::InvalidNumber {
            line: self.line,
            token: value.to_string(),
        })
    }

    /// Fails if any non-blank line remains.
    fn finish(mut self, declared: usize) -> Result<(), ParseError> {
        match self.lines.find(|(_, text)| !text.trim().is_empty()) {
            Some((idx, _)) => Err(ParseError::TrailingContent {
                line: idx + 1,
                declared,
            }),
            None => Ok(()),
        }
    }
}

impl Instance {
    /// Parses an instance from its text form.
    ///
    /// Every cache receives the capacity given in the header.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] with the offending line number when the
    /// text is truncated, contains non-numeric tokens, has lines with
    /// the wrong field count, references ids beyond the declared counts,
    /// declares more than [`MAX_CACHES`] caches, or carries extra content
    /// after the last request line.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut cur = Cursor::new(text);

        let header = cur.fields(Some(5), "header")?;
        let num_videos = cur.count(header[0])?;
        let num_endpoints = cur.count(header[1])?;
        let num_requests = cur.count(header[2])?;
        let num_caches = cur.count(header[3])?;
        let cache_size = header[4];
        if num_caches > MAX_CACHES {
            return Err(ParseError::TooManyCaches {
                line: 1,
                count: num_caches,
                limit: MAX_CACHES,
            });
        }

        let sizes = cur.fields(Some(num_videos), "video sizes")?;

        let mut endpoints = Vec::new();
        for _ in 0..num_endpoints {
            let desc = cur.fields(Some(2), "endpoint description")?;
            let origin = desc[0];
            let reachable = cur.count(desc[1])?;
            let mut links = Vec::new();
            for _ in 0..reachable {
                let link = cur.fields(Some(2), "cache latency")?;
                let cache = cur.id(link[0], num_caches, "cache")?;
                links.push((CacheId(cache), link[1]));
            }
            endpoints.push(Endpoint::new(origin, links));
        }

        let mut requests = Vec::new();
        for _ in 0..num_requests {
            let r = cur.fields(Some(3), "request description")?;
            let video = cur.id(r[0], num_videos, "video")?;
            let endpoint = cur.id(r[1], num_endpoints, "endpoint")?;
            requests.push(Request {
                video: VideoId(video),
                endpoint: EndpointId(endpoint),
                count: r[2],
            });
        }

        cur.finish(num_requests)?;

        let capacities = vec![cache_size; num_caches];
        Ok(Instance::new(&sizes, &capacities, endpoints, requests)?)
    }
}

impl FromStr for Instance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instance::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    const EXAMPLE: &str = "\
5 2 4 3 100
50 50 80 30 110
1000 3
0 100
2 200
1 300
500 0
3 0 1500
0 1 1000
4 0 500
1 0 1000
";

    #[test]
    fn test_parse_example() {
        let inst: Instance = EXAMPLE.parse().unwrap();
        assert_eq!(inst.num_videos(), 5);
        assert_eq!(inst.num_endpoints(), 2);
        assert_eq!(inst.num_caches(), 3);
        assert!(inst.caches().iter().all(|c| c.capacity == 100));
        assert_eq!(inst.video_size(VideoId(4)), 110);

        let e0 = inst.endpoint(EndpointId(0));
        assert_eq!(e0.origin_latency(), 1000);
        assert_eq!(e0.latency_to(CacheId(2)), Some(200));
        assert!(inst.endpoint(EndpointId(1)).links().is_empty());

        assert_eq!(inst.requests().len(), 4);
        assert_eq!(inst.total_requests(), 4000);
    }

    #[test]
    fn test_truncated_input() {
        let err = Instance::parse("5 2 4 3 100\n50 50 80 30 110\n1000 3\n0 100\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                line: 5,
                expected: "cache latency"
            }
        );
    }

    #[test]
    fn test_wrong_field_count() {
        let err = Instance::parse("2 0 0 1 10\n1 2 3\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldCount {
                line: 2,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_invalid_token() {
        let err = Instance::parse("1 0 0 1 x\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 1, .. }));
    }

    #[test]
    fn test_out_of_range_ids() {
        let err = Instance::parse("1 1 0 1 10\n5\n10 1\n7 2\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::IdOutOfRange {
                line: 4,
                kind: "cache",
                id: 7,
                count: 1
            }
        ));

        let err = Instance::parse("1 1 1 1 10\n5\n10 0\n0 3 9\n").unwrap_err();
        assert!(matches!(err, ParseError::IdOutOfRange { kind: "endpoint", .. }));
    }

    #[test]
    fn test_trailing_content() {
        let err = Instance::parse("1 1 0 1 10\n5\n10 0\n0 0 1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::TrailingContent {
                line: 4,
                declared: 0
            }
        );
        assert!(Instance::parse("1 1 0 1 10\n5\n10 0\n\n  \n").is_ok());
    }

    #[test]
    fn test_model_errors_propagate() {
        let err = Instance::parse("1 0 0 1 10\n0\n").unwrap_err();
        assert_eq!(err, ParseError::Model(ModelError::ZeroVideoSize(VideoId(0))));
    }

    #[test]
    fn test_huge_header_counts_fail_on_missing_lines() {
        let err = Instance::parse("1 0 4000000000 1 10\n5\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                line: 3,
                expected: "request description"
            }
        );

        let err = Instance::parse("1 4000000000 0 1 10\n5\n10 0\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { line: 4, .. }));

        let err = Instance::parse("1 1 0 1 10\n5\n10 4000000000\n0 5\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { line: 5, .. }));
    }

    #[test]
    fn test_too_many_caches() {
        let err = Instance::parse("0 0 0 1000000000000000000 10\n\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::TooManyCaches {
                line: 1,
                limit: MAX_CACHES,
                ..
            }
        ));

        let text = format!("1 0 0 {MAX_CACHES} 10\n5\n");
        assert_eq!(Instance::parse(&text).unwrap().num_caches(), MAX_CACHES);
    }

    #[test]
    fn test_request_total_overflow() {
        let text = format!("1 2 2 1 10\n5\n10 0\n10 0\n0 0 {}\n0 1 2\n", u64::MAX);
        assert_eq!(
            Instance::parse(&text).unwrap_err(),
            ParseError::Model(ModelError::RequestTotalOverflow)
        );
    }
}
