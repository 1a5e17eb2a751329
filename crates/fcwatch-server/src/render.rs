//! HTML rendering for the roster view and the admin page.
//!
//! Pure functions from state to markup; nothing here touches the store.

use std::fmt::Write as _;

use fcwatch_core::snapshot::Snapshot;

/// Shown in place of the in-game name for a blacklisted FC that has never
/// been observed.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Render the public roster page.
///
/// Blacklist entries come first, each annotated with the player's current
/// name. Then every player not on the blacklist, ascending by FC, then the
/// change log in append order.
pub fn index(snapshot: &Snapshot) -> String {
  let mut body = String::from("<h1>Player Logs</h1>\n<ul>\n");

  for bl in &snapshot.blacklist {
    let current = snapshot
      .player(bl.fc)
      .map_or(UNKNOWN_NAME, |p| p.name.as_str());
    let _ = writeln!(
      body,
      "<li class=\"blacklist\"><strong>Blacklist:</strong> {} ({}): {}</li>",
      bl.fc,
      escape(&bl.name),
      escape(current),
    );
  }

  let mut players: Vec<_> = snapshot
    .players
    .iter()
    .filter(|p| !snapshot.is_blacklisted(p.fc))
    .collect();
  players.sort_by_key(|p| p.fc);
  for p in players {
    let _ = writeln!(body, "<li>{}: {}</li>", p.fc, escape(&p.name));
  }

  body.push_str("</ul>\n<h2>Change Logs</h2>\n<ul>\n");
  for entry in &snapshot.logs {
    match entry.recorded_at {
      Some(at) => {
        let _ = writeln!(
          body,
          "<li><time datetime=\"{}\">{}</time> {}</li>",
          at.to_rfc3339(),
          at.format("%Y-%m-%d %H:%M:%S UTC"),
          escape(&entry.to_string()),
        );
      }
      None => {
        let _ = writeln!(body, "<li>{}</li>", escape(&entry.to_string()));
      }
    }
  }
  body.push_str("</ul>\n<p><a href=\"/download\"><button>Download Log</button></a></p>\n");

  page("Player Log", &body)
}

/// Render the admin page: the blacklist form and the snapshot upload form.
///
/// `token` is the caller's already-verified admin token; it is carried in the
/// form actions because the gate reads it from the query string.
pub fn admin(token: &str) -> String {
  let query = escape(&format!("token={}", urlencoding::encode(token)));
  let body = format!(
    "<h1>Add Blacklist</h1>
<form action=\"/blacklist?{query}\" method=\"post\">
  FC: <input type=\"number\" name=\"fc\" required><br>
  Name: <input type=\"text\" name=\"name\" required><br>
  <button type=\"submit\">Add</button>
</form>
<h2>Upload Log</h2>
<form action=\"/upload?{query}\" method=\"post\" enctype=\"multipart/form-data\">
  <input type=\"file\" name=\"logFile\" accept=\"application/json\">
  <button type=\"submit\">Upload Log</button>
</form>
<p><a href=\"/\">Back</a></p>
"
  );
  page("Admin", &body)
}

fn page(title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"><title>{title}</title></head>
<body>
{body}</body>
</html>
"
  )
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}
