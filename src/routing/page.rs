//! HTML for the search page and 404 bodies.

use std::fmt::Write;

use crate::http::response::escape_html;
use crate::index::SearchResult;

const SEARCH_FORM: &str = "<html><head><title>search-server</title></head>\n\
<body>\n\
<center style=\"font-size:300%;\">search-server</center>\n\
<div style=\"height:20px;\"></div>\n\
<center>\n\
<form action=\"/query\" method=\"get\">\n\
<input type=\"text\" size=30 name=\"terms\" />\n\
<input type=\"submit\" value=\"Search\" />\n\
</form>\n\
</center><p>\n";

const PAGE_END: &str = "</body>\n</html>\n";

/// The search form, plus a results section when a query was run.
///
/// Each result links to its document under `static_prefix`.
pub fn render_search_page(
    query: Option<(&str, &[SearchResult])>,
    static_prefix: &str,
) -> String {
    let mut page = String::from(SEARCH_FORM);

    if let Some((query, results)) = query {
        page.push_str("<h2>Search results:</h2>\n");
        let _ = writeln!(
            page,
            "<p>{} results found for \"{}\"</p>",
            results.len(),
            escape_html(query)
        );
        for result in results {
            let doc = escape_html(&result.doc);
            let _ = writeln!(
                page,
                "<p><a href=\"{}{}\">{}</a> ({})</p>",
                static_prefix,
                doc.trim_start_matches('/'),
                doc,
                result.rank
            );
        }
    }

    page.push_str(PAGE_END);
    page
}

/// Body of a 404 for a static file that could not be read.
pub fn render_not_found(filename: &str) -> String {
    format!(
        "<html><body>Couldn't find file \"{}\"</body></html>\n",
        escape_html(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_only_without_query() {
        let page = render_search_page(None, "/static/");
        assert!(page.contains("<form action=\"/query\""));
        assert!(!page.contains("Search results"));
    }

    #[test]
    fn lists_results_with_links() {
        let results = vec![
            SearchResult::new("docs/a.txt", 3),
            SearchResult::new("docs/b&c.txt", 1),
        ];
        let page = render_search_page(Some(("cat+dog", results.as_slice())), "/static/");

        assert!(page.contains("2 results found for \"cat+dog\""));
        assert!(page.contains("<a href=\"/static/docs/a.txt\">docs/a.txt</a> (3)"));
        assert!(page.contains("<a href=\"/static/docs/b&amp;c.txt\">docs/b&amp;c.txt</a> (1)"));
        assert!(page.find("a.txt").unwrap() < page.find("b&amp;c.txt").unwrap());
    }

    #[test]
    fn zero_results_still_show_section() {
        let none: &[SearchResult] = &[];
        let page = render_search_page(Some(("zebra", none)), "/static/");
        assert!(page.contains("0 results found for \"zebra\""));
    }

    #[test]
    fn query_text_is_escaped() {
        let none: &[SearchResult] = &[];
        let page = render_search_page(Some(("<script>", none)), "/static/");
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn not_found_escapes_name() {
        assert_eq!(
            render_not_found("<b>.png"),
            "<html><body>Couldn't find file \"&lt;b&gt;.png\"</body></html>\n"
        );
    }
}
