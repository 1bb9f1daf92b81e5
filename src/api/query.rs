//! PostgREST query strings (`col=eq.v`, `col=in.(..)`, `order=`, `limit=`).

/// A single row predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Filter {
    Eq { column: String, value: String },
    In { column: String, values: Vec<String> },
}

impl Filter {
    pub(crate) fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// Operator part as PostgREST expects it after `column=`.
    pub(crate) fn operand(&self) -> String {
        match self {
            Filter::Eq { value, .. } => format!("eq.{value}"),
            Filter::In { values, .. } => {
                let quoted: Vec<String> = values
                    .iter()
                    .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
                    .collect();
                format!("in.({})", quoted.join(","))
            }
        }
    }

    /// Same predicate in the `column=op.value` form used by realtime channel filters.
    pub(crate) fn to_change_filter(&self) -> String {
        match self {
            Filter::Eq { column, value } => format!("{column}=eq.{value}"),
            Filter::In { column, values } => format!("{column}=in.({})", values.join(",")),
        }
    }

    /// Evaluate against a JSON row. Used by in-memory stores.
    #[cfg(test)]
    pub(crate) fn matches(&self, row: &serde_json::Value) -> bool {
        let cell = row.get(self.column()).map(value_as_text);
        match self {
            Filter::Eq { value, .. } => cell.as_deref() == Some(value.as_str()),
            Filter::In { values, .. } => cell.map(|c| values.contains(&c)).unwrap_or(false),
        }
    }
}

#[cfg(test)]
pub(crate) fn value_as_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Query {
    select: Option<String>,
    filters: Vec<Filter>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub(crate) fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub(crate) fn in_list<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.filters.push(Filter::In {
            column: column.to_string(),
            values: values.into_iter().map(|s| s.as_ref().to_string()).collect(),
        });
        self
    }

    pub(crate) fn order(mut self, column: &str, descending: bool) -> Self {
        self.order = Some((column.to_string(), descending));
        self
    }

    pub(crate) fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub(crate) fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[cfg(test)]
    pub(crate) fn ordering(&self) -> Option<(&str, bool)> {
        self.order.as_ref().map(|(c, d)| (c.as_str(), *d))
    }

    #[cfg(test)]
    pub(crate) fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Render as a URL query string (without the leading `?`).
    pub(crate) fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(cols) = &self.select {
            parts.push(format!("select={}", urlencoding::encode(cols)));
        }

        for f in &self.filters {
            parts.push(format!(
                "{}={}",
                urlencoding::encode(f.column()),
                urlencoding::encode(&f.operand())
            ));
        }

        if let Some((col, desc)) = &self.order {
            let dir = if *desc { "desc" } else { "asc" };
            parts.push(format!("order={}.{}", urlencoding::encode(col), dir));
        }

        if let Some(n) = self.limit {
            parts.push(format!("limit={n}"));
        }

        parts.join("&")
    }
}
