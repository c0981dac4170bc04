//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILES;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Site
description: Software engineer sharing his experience.
author: John Doe
language: en
keywords: []

# URL
url: http://example.com
root: /

# Directory
content_dir: content
public_dir: public
static_dir: static

# Content
blog_category: posts
recent_posts: 4
render_drafts: false
# What to do with posts missing a title or date: skip | abort
malformed: skip
cache: true

# Date format
date_format: YYYY-MM-DD

highlight:
  theme: base16-ocean.dark
  line_number: true

# Navigation
nav:
  - title: Home
    href: /
  - title: Blog
    href: /blog

# Footer links, grouped
links:
  personal:
    - title: GitHub
      href: https://github.com/
      icon: github
    - title: X/Twitter
      href: https://twitter.com/
      icon: x
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    if let Some(existing) = CONFIG_FILES
        .iter()
        .map(|name| target_dir.join(name))
        .find(|path| path.exists())
    {
        bail!("A site already exists here: {:?}", existing);
    }

    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    fs::write(target_dir.join("_config.yml"), DEFAULT_CONFIG)?;

    let today = chrono::Local::now().date_naive();
    let sample_post = format!(
        r#"---
title: Hello World
description: The first post on this site.
date: {}
---

Welcome! This is your very first post.

## Quick Start

```bash
$ folio-rs new "My New Post"
$ folio-rs server
$ folio-rs generate
```
"#,
        today.format("%Y-%m-%d")
    );

    fs::write(target_dir.join("content/posts/hello-world.md"), sample_post)?;

    Ok(())
}
