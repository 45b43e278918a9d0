use crate::error::Error;
use std::collections::HashMap;

///
/// RangeQuery
///
/// A caller-requested inclusive `[start, end]` window over a conceptually
/// ordered result list. Defaults to the first ten items.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RangeQuery {
    pub start: usize,
    pub end: usize,
}

impl RangeQuery {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Capacity hint for the requested slice.
    #[must_use]
    pub const fn slice_len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Parse the window out of boundary query parameters. Three encodings
    /// are accepted:
    /// - `range`: JSON `[start, end]` (react-admin simple-rest);
    /// - `_start`/`_end`: zero-based index pair (react-admin json-server);
    /// - `_page`/`_per_page`: one-based paging, per-page defaulting to 10.
    /// With no useful parameters the default window `[0, 9]` applies.
    pub fn parse_params(params: &HashMap<String, String>) -> Result<Self, Error> {
        let mut bounds: Option<(usize, usize)> = None;

        match (params.get("_start"), params.get("_end")) {
            (Some(start), Some(end)) => {
                let start = parse_index(start, "_start")?;
                let end = parse_index(end, "_end")?;
                bounds = Some((start, end));
            }
            (Some(_), None) => return Err(Error::bad_filter("missing _end with _start")),
            (None, Some(_)) => return Err(Error::bad_filter("missing _start with _end")),
            (None, None) => {}
        }

        // A range parameter wins over the index pair.
        if let Some(raw) = params.get("range") {
            let values: Vec<i64> = serde_json::from_str(raw)
                .map_err(|err| Error::bad_filter(format!("invalid range: {err}")))?;
            if values.len() != 2 {
                return Err(Error::bad_filter(format!(
                    "expect exactly 2 range elements; got {}",
                    values.len()
                )));
            }
            let start = usize::try_from(values[0])
                .map_err(|_| Error::bad_filter("start index is less than zero"))?;
            let end = usize::try_from(values[1])
                .map_err(|_| Error::bad_filter("end index is less than zero"))?;
            bounds = Some((start, end));
        }

        if let Some((start, end)) = bounds {
            if start > end {
                return Err(Error::bad_filter("start index is greater than end"));
            }
            return Ok(Self::new(start, end));
        }

        let page = match params.get("_page") {
            Some(raw) => {
                let page = parse_index(raw, "_page")?;
                if page < 1 {
                    return Err(Error::bad_filter("_page is less than one"));
                }
                Some(page)
            }
            None => None,
        };

        let per_page = match params.get("_per_page") {
            Some(raw) => {
                let per_page = parse_index(raw, "_per_page")?;
                if per_page < 1 {
                    return Err(Error::bad_filter("_per_page is less than one"));
                }
                Some(per_page)
            }
            None => None,
        };

        if page.is_some() || per_page.is_some() {
            let page = page.unwrap_or(1);
            let per_page = per_page.unwrap_or(10);
            return Ok(Self::new((page - 1) * per_page, page * per_page - 1));
        }

        Ok(Self::default())
    }

    /// Parse a `Range: <unit>=<start>-<end>` header. Multiple and negative
    /// ranges are not supported.
    pub fn parse_header(header: &str, unit: &str) -> Result<Self, Error> {
        let rest = header
            .strip_prefix(unit)
            .and_then(|rest| rest.strip_prefix('='))
            .ok_or_else(|| Error::bad_filter(format!("invalid range unit; expected {unit}")))?;

        if rest.contains(',') {
            return Err(Error::bad_filter("multiple ranges are not supported"));
        }

        let set = rest.trim();
        if set.starts_with('-') {
            return Err(Error::bad_filter(format!(
                "negative ranges are not supported: {set}"
            )));
        }

        let (start, end) = set
            .split_once('-')
            .ok_or_else(|| Error::bad_filter(format!("malformed range: {set}")))?;

        let start = parse_index(start, "start")?;
        let end = parse_index(end, "end")?;
        if end < start {
            return Err(Error::bad_filter(format!(
                "invalid range, end before start ({end} < {start})"
            )));
        }

        Ok(Self::new(start, end))
    }
}

impl Default for RangeQuery {
    fn default() -> Self {
        Self { start: 0, end: 9 }
    }
}

fn parse_index(raw: &str, name: &str) -> Result<usize, Error> {
    raw.parse()
        .map_err(|err| Error::bad_filter(format!("malformed {name} value ({raw}): {err}")))
}

///
/// RangeResult
///
/// The realized window plus the true total, reported alongside every list
/// response.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RangeResult {
    pub start: usize,
    pub end: usize,
    pub size: usize,
}

impl RangeResult {
    /// Render a `Content-Range` style header: `<unit> <start>-<end>/<size>`.
    #[must_use]
    pub fn content_range(&self, unit: &str) -> String {
        format!("{unit} {}-{}/{}", self.start, self.end, self.size)
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.start == 0 && self.end == 0 && self.size == 0
    }
}
