// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Triage page template

use minijinja::{context, Environment};

use crate::buckets::BucketGroups;
use crate::engine::SortStats;
use crate::Result;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>bucketsort</title>
    <link rel="stylesheet" href="/static/style.css">
    <style>
        :root {
            --bg-primary: #1a1a2e;
            --bg-secondary: #16213e;
            --text-primary: #e8e8e8;
            --text-secondary: #a0a0a0;
            --accent: #e94560;
            --border: #2a2a4a;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            height: 100vh;
            display: flex;
            flex-direction: column;
        }
        header {
            background: var(--bg-secondary);
            padding: 10px 20px;
            display: flex;
            justify-content: space-between;
            border-bottom: 1px solid var(--border);
        }
        header .progress { color: var(--text-secondary); }
        main { flex: 1; display: grid; grid-template-columns: 200px 1fr 200px; min-height: 0; }
        .side { display: flex; flex-direction: column; gap: 10px; padding: 20px; }
        .side button {
            padding: 18px;
            border: 1px solid var(--border);
            border-radius: 8px;
            background: var(--bg-secondary);
            color: var(--text-primary);
            font-size: 1.1em;
            cursor: pointer;
        }
        .side button:hover { border-color: var(--accent); }
        .stage { display: flex; align-items: center; justify-content: center; min-height: 0; }
        .stage img { max-width: 100%; max-height: 100%; object-fit: contain; }
        .stage .done { color: var(--text-secondary); font-size: 1.4em; }
        #undo { background: none; border: 1px solid var(--accent); color: var(--accent); padding: 4px 12px; border-radius: 6px; cursor: pointer; }
    </style>
</head>
<body>
    <header>
        <span class="progress" id="progress">{{ stats.assigned }} / {{ stats.total }} sorted</span>
        <button id="undo" type="button">Undo</button>
    </header>
    <main>
        <div class="side left">
            {% for name in left %}<button type="button" data-bucket="{{ name }}">{{ name }}</button>
            {% endfor %}
        </div>
        <div class="stage" id="stage"></div>
        <div class="side right">
            {% for name in right %}<button type="button" data-bucket="{{ name }}">{{ name }}</button>
            {% endfor %}
        </div>
    </main>
    <script>
        const sorted = [];
        let current = "";

        async function refreshProgress() {
            const res = await fetch("/info/stats");
            if (!res.ok) return;
            const stats = await res.json();
            document.getElementById("progress").textContent = stats.assigned + " / " + stats.total + " sorted";
        }

        async function showNext() {
            const res = await fetch("/img/next");
            const next = await res.json();
            const stage = document.getElementById("stage");
            current = next.uuid;
            if (!current) {
                stage.innerHTML = '<span class="done">Nothing left to sort</span>';
            } else {
                stage.innerHTML = "";
                const img = document.createElement("img");
                img.src = "/img/get?uuid=" + encodeURIComponent(current);
                stage.appendChild(img);
            }
            refreshProgress();
        }

        async function post(url, fields) {
            const res = await fetch(url, { method: "POST", body: new URLSearchParams(fields) });
            if (!res.ok) {
                const body = await res.json().catch(() => ({ error: res.statusText }));
                alert(body.error);
            }
            return res.ok;
        }

        document.querySelectorAll("[data-bucket]").forEach((button) => {
            button.addEventListener("click", async () => {
                if (!current) return;
                const uuid = current;
                if (await post("/bucket/set", { uuid: uuid, bucket: button.dataset.bucket })) {
                    sorted.push(uuid);
                }
                showNext();
            });
        });

        document.getElementById("undo").addEventListener("click", async () => {
            const uuid = sorted.pop();
            if (!uuid) return;
            await post("/bucket/undo", { uuid: uuid });
            showNext();
        });

        showNext();
    </script>
</body>
</html>
"#;

/// Compiled page templates, built once at startup
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render_index(&self, groups: &BucketGroups, stats: &SortStats) -> Result<String> {
        let template = self.env.get_template("index.html")?;
        let html = template.render(context! {
            left => &groups.left,
            right => &groups.right,
            stats => stats,
        })?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_index_lists_buckets_and_escapes() {
        let templates = Templates::new().unwrap();
        let groups = BucketGroups {
            left: vec!["keep".to_string()],
            right: vec!["<toss>".to_string()],
        };
        let stats = SortStats {
            total: 4,
            assigned: 1,
            unassigned: 3,
            per_bucket: Vec::new(),
            scanned_at: Utc::now(),
        };

        let html = templates.render_index(&groups, &stats).unwrap();
        assert!(html.contains(r#"data-bucket="keep""#));
        assert!(html.contains("&lt;toss&gt;"));
        assert!(!html.contains("<toss>"));
        assert!(html.contains("1 / 4 sorted"));
    }
}
