//! Human-facing pages: the status summary and the API documentation.

use axum::extract::State;
use axum::response::Html;

use crate::router::SharedState;

/// `GET /rpc/stats` — a plain status page with version, last refresh time
/// and package count.
pub async fn stats_handler(State(state): State<SharedState>) -> Html<String> {
    let catalog = state.catalog();
    let last_refresh = state.last_refresh().map_or_else(
        || "never".to_owned(),
        |t| t.format("%Y-%m-%d - %H:%M:%S (UTC)").to_string(),
    );
    Html(format!(
        "<html>\n<pre>\n<b>aurrpc</b><br/>\n\
         version:\t\t\t{}\n\
         last refresh:\t\t\t{last_refresh}\n\
         number of packages:\t\t{}\n\
         </pre>\n</html>\n",
        env!("CARGO_PKG_VERSION"),
        catalog.len(),
    ))
}

/// `GET /rpc/doc` — usage documentation; the bare `/rpc` call redirects
/// here.
pub async fn doc_handler() -> Html<&'static str> {
    Html(DOC)
}

const DOC: &str = r#"<!DOCTYPE html>
<html>
<head><title>aurrpc - API documentation</title></head>
<body>
<h1>aurrpc</h1>
<p>Read-only RPC interface over the AUR package metadata set.</p>

<h2>Legacy interface (v5)</h2>
<p><code>GET /rpc?v=5&amp;type=&lt;type&gt;&amp;arg=&lt;arg&gt;</code></p>
<ul>
<li><code>type</code> - one of <code>info</code>, <code>multiinfo</code>,
<code>search</code>, <code>msearch</code>, <code>suggest</code>,
<code>suggest-pkgbase</code>, <code>opensearch-suggest</code>,
<code>opensearch-suggest-pkgbase</code></li>
<li><code>by</code> - search axis: <code>name</code>, <code>name-desc</code>
(default), <code>maintainer</code>, <code>submitter</code>,
<code>comaintainers</code>, <code>depends</code>, <code>makedepends</code>,
<code>optdepends</code>, <code>checkdepends</code>, <code>provides</code>,
<code>conflicts</code>, <code>replaces</code>, <code>groups</code>,
<code>keywords</code></li>
<li><code>arg</code> - search term; repeat <code>arg[]</code> for multiple
info lookups</li>
<li><code>callback</code> - JSONP callback name</li>
</ul>
<p>Path form: <code>/rpc/v5/&lt;type&gt;/&lt;arg&gt;</code></p>

<h2>Path interface (v6)</h2>
<p><code>GET /api/v6/&lt;type&gt;/[&lt;by&gt;/[&lt;mode&gt;/]]&lt;arg&gt;</code></p>
<p>Modes: <code>contains</code> (default), <code>starts-with</code>.
Name searches treat spaces as term separators; every term must match.</p>

<h2>Examples</h2>
<pre>
/rpc?v=5&amp;type=info&amp;arg=my-package
/rpc?v=5&amp;type=search&amp;by=maintainer&amp;arg=someone
/api/v6/search/name/starts-with/my-pack
/api/v6/info?by=provides&amp;arg=libfoo&amp;arg=libbar
</pre>
</body>
</html>
"#;
