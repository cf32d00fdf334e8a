//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Site
title: Wayko
subtitle: ''
description: Write-ups, articles techniques, réflexions et updates de projets en cybersécurité
keywords:
  - cybersécurité
  - pentest
  - ctf
author: Franck Chevalier
email: franck@chvl.re
github: https://github.com/WaykoDev
linkedin: ''
language: fr
timezone: Europe/Paris

# URL
url: http://example.com
root: /
blog_route: blog

# Directory
content_dir: content
blog_dir: blog
pages_dir: pages
static_dir: static
public_dir: public

# Writing
render_drafts: false
reading_speed: 200
excerpt_length: 150
highlight:
  theme: base16-ocean.dark
  line_number: true

# Feed
feed_limit: 20

# Navigation
menu:
  - name: Blog
    path: /blog
  - name: About
    path: /about
  - name: Contact
    path: /contact
"#;

const HOME_PAGE: &str = r#"---
title: Accueil
---

Pentester et joueur de CTF. Ce site rassemble mes write-ups et mes notes.
"#;

const ABOUT_PAGE: &str = r#"---
title: About
description: Qui suis-je ?
order: 1
---

<Showcase role="Pentester" />

Quelques mots sur mon parcours.
"#;

const CONTACT_PAGE: &str = r#"---
title: Contact
description: Une question, une proposition de mission ?
layout: contact
order: 2
---

N'hésitez pas à me contacter.
"#;

const DISCLOSURE_PAGE: &str = r#"---
title: Politique de divulgation
description: Comment je signale les vulnérabilités découvertes
order: 3
---

Les vulnérabilités sont signalées en privé à l'éditeur, avec un délai de 90 jours
avant publication.
"#;

const ETHICS_PAGE: &str = r#"---
title: Éthique de recherche
description: Le cadre de mes travaux de recherche
order: 4
---

Aucun test n'est mené sans autorisation explicite du propriétaire du système.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    if target_dir.join("_config.yml").exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    fs::create_dir_all(target_dir.join("content/blog"))?;
    fs::create_dir_all(target_dir.join("content/pages"))?;
    fs::create_dir_all(target_dir.join("static/img"))?;

    fs::write(target_dir.join("_config.yml"), CONFIG)?;
    fs::write(target_dir.join("content/pages/index.md"), HOME_PAGE)?;
    fs::write(target_dir.join("content/pages/about.md"), ABOUT_PAGE)?;
    fs::write(target_dir.join("content/pages/contact.md"), CONTACT_PAGE)?;
    fs::write(
        target_dir.join("content/pages/disclosure-policy.md"),
        DISCLOSURE_PAGE,
    )?;
    fs::write(target_dir.join("content/pages/research-ethics.md"), ETHICS_PAGE)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
description: Premier article du blog
date: {}
tags: [tutorial]
---

Bienvenue sur le blog !

<Callout type="info" title="Astuce">
Créez un article avec `wayko new "Mon article"`.
</Callout>

## Démarrer

```bash
$ wayko server
```

## Générer le site

```bash
$ wayko generate
```
"#,
        today
    );
    fs::write(target_dir.join("content/blog/hello-world.mdx"), sample_post)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.timezone, "Europe/Paris");
        assert_eq!(site.config.menu.len(), 3);

        let repo = site.load_content().unwrap();
        assert_eq!(repo.list_posts().len(), 1);
        assert_eq!(repo.list_posts()[0].title, "Hello World");
        assert_eq!(repo.list_posts()[0].url, "/blog/hello-world");
        assert!(repo.get_page("").is_some());
        assert_eq!(repo.get_page("contact").unwrap().layout, "contact");
        assert_eq!(
            repo.get_page("disclosure-policy").unwrap().title,
            "Politique de divulgation"
        );
        assert!(repo.get_page("research-ethics").is_some());
        assert_eq!(repo.pages().len(), 5);
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
