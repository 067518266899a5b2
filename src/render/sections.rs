//! Presentation of each block type.

use super::html::{escape_html, safe_href, sanitize_rich_text};
use super::BlockScope;
use crate::blocks::props::{
    CardProps, ContactFormProps, FeatureGridProps, HeroProps, ImageTextProps, TextProps,
};
use crate::blocks::BlockProps;

pub(super) fn render_block(scope: &mut BlockScope<'_, '_>) -> String {
    let block = scope.block;
    match block.props() {
        BlockProps::Hero(p) => hero(scope, p),
        BlockProps::Text(p) => text(scope, p),
        BlockProps::FeatureGrid(p) => feature_grid(scope, p),
        BlockProps::Card(p) => card(scope, p),
        BlockProps::ImageText(p) => image_text(scope, p),
        BlockProps::ContactForm(p) => contact_form(scope, p),
    }
}

fn section_style(scope: &BlockScope<'_, '_>) -> String {
    format!(
        "padding: var(--section-spacing) 0; color: {}; font-family: var(--font-body);",
        scope.ctx.theme.var_or("--color-text", "--color-secondary")
    )
}

fn hero(scope: &mut BlockScope<'_, '_>, p: &HeroProps) -> String {
    let background = scope.ctx.theme.var_or("--hero-gradient", "--color-primary");
    let mut out = format!(
        "<section class=\"cms-block cms-hero cms-hero--{}\" style=\"position: relative; background: {}; color: var(--color-primary-contrast); padding: var(--section-spacing) 0; text-align: {};\"{}>",
        p.alignment.as_str(),
        background,
        p.alignment.as_str(),
        scope.block_attrs()
    );

    if let Some(url) = scope.media_url(p.background_image.as_deref()) {
        let attrs = scope.edit_attrs("background_image");
        out.push_str(&format!(
            "<div class=\"cms-hero__media\" style=\"position: absolute; inset: 0; background-image: url('{}'); background-size: cover; background-position: center;\"{}></div>",
            escape_html(&url),
            attrs
        ));
    } else {
        out.push_str(&scope.placeholder("div", "cms-hero__media", "background_image"));
    }
    if scope.ctx.theme.contains("--hero-overlay") {
        out.push_str(
            "<div class=\"cms-hero__overlay\" style=\"position: absolute; inset: 0; background: var(--hero-overlay);\"></div>",
        );
    }

    out.push_str("<div class=\"cms-container\" style=\"position: relative; max-width: var(--container-width); margin: 0 auto;\">");
    let attrs = scope.edit_attrs("headline");
    out.push_str(&format!(
        "<h1 class=\"cms-hero__headline\" style=\"font-family: var(--font-heading);\"{}>{}</h1>",
        attrs,
        escape_html(&p.headline)
    ));
    if let Some(sub) = p.subheadline.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("subheadline");
        out.push_str(&format!(
            "<p class=\"cms-hero__subheadline\"{}>{}</p>",
            attrs,
            escape_html(sub)
        ));
    } else {
        out.push_str(&scope.placeholder("p", "cms-hero__subheadline", "subheadline"));
    }
    if let Some(label) = p.cta_label.as_deref().filter(|s| !s.is_empty()) {
        let href = safe_href(p.cta_href.as_deref().unwrap_or("#"));
        let attrs = scope.edit_attrs("cta_label");
        out.push_str(&format!(
            "<a class=\"cms-button\" href=\"{}\" style=\"background: var(--color-accent); border-radius: var(--radius-button);\"{}>{}</a>",
            href,
            attrs,
            escape_html(label)
        ));
    } else {
        out.push_str(&scope.placeholder("span", "cms-button", "cta_label"));
    }
    out.push_str(&scope.setting("cta_href"));
    out.push_str(&scope.setting("alignment"));
    out.push_str("</div></section>");
    out
}

fn text(scope: &mut BlockScope<'_, '_>, p: &TextProps) -> String {
    let style = section_style(scope);
    let attrs = scope.edit_attrs("content");
    let alignment = scope.setting("alignment");
    format!(
        "<section class=\"cms-block cms-text\" style=\"{} text-align: {};\"{}><div class=\"cms-container cms-richtext\" style=\"max-width: var(--container-width); margin: 0 auto;\"{}>{}</div>{}</section>",
        style,
        p.alignment.as_str(),
        scope.block_attrs(),
        attrs,
        sanitize_rich_text(&p.content),
        alignment
    )
}

fn feature_grid(scope: &mut BlockScope<'_, '_>, p: &FeatureGridProps) -> String {
    let mut out = format!(
        "<section class=\"cms-block cms-feature-grid\" style=\"{}\"{}><div class=\"cms-container\" style=\"max-width: var(--container-width); margin: 0 auto;\">",
        section_style(scope),
        scope.block_attrs()
    );
    if let Some(title) = p.title.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("title");
        out.push_str(&format!(
            "<h2 class=\"cms-section-title\" style=\"font-family: var(--font-heading); color: var(--color-primary);\"{}>{}</h2>",
            attrs,
            escape_html(title)
        ));
    } else {
        out.push_str(&scope.placeholder("h2", "cms-section-title", "title"));
    }

    // The list itself is edited in the inspector; its item fields carry hooks.
    out.push_str(&format!(
        "<ul class=\"cms-feature-grid__items\" style=\"display: grid; grid-template-columns: repeat({}, minmax(0, 1fr)); gap: 1.5rem; list-style: none; padding: 0;\">",
        p.columns.clamp(1, 4)
    ));
    for (i, item) in p.items.iter().enumerate() {
        out.push_str("<li class=\"cms-feature\" style=\"background: var(--color-surface); border-radius: var(--radius-card); padding: 1.5rem;\">");
        if let Some(icon) = item.icon.as_deref().filter(|s| !s.is_empty()) {
            let attrs = scope.edit_attrs(&format!("items.{}.icon", i));
            out.push_str(&format!(
                "<span class=\"cms-feature__icon\" data-icon=\"{}\" style=\"color: var(--color-accent);\"{}></span>",
                escape_html(icon),
                attrs
            ));
        } else {
            out.push_str(&scope.placeholder("span", "cms-feature__icon", &format!("items.{}.icon", i)));
        }
        let attrs = scope.edit_attrs(&format!("items.{}.title", i));
        out.push_str(&format!(
            "<h3 class=\"cms-feature__title\" style=\"font-family: var(--font-heading);\"{}>{}</h3>",
            attrs,
            escape_html(&item.title)
        ));
        if let Some(description) = item.description.as_deref().filter(|s| !s.is_empty()) {
            let attrs = scope.edit_attrs(&format!("items.{}.description", i));
            out.push_str(&format!(
                "<p class=\"cms-feature__description\" style=\"color: var(--color-muted);\"{}>{}</p>",
                attrs,
                escape_html(description)
            ));
        } else {
            out.push_str(&scope.placeholder(
                "p",
                "cms-feature__description",
                &format!("items.{}.description", i),
            ));
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out.push_str(&scope.setting("columns"));
    out.push_str("</div></section>");
    out
}

fn card(scope: &mut BlockScope<'_, '_>, p: &CardProps) -> String {
    let mut out = format!(
        "<article class=\"cms-block cms-card cms-card--{}\" style=\"background: var(--color-surface); border-radius: var(--radius-card); padding: 1.5rem; margin: 1rem auto; max-width: var(--container-width);\"{}>",
        p.variant.as_str(),
        scope.block_attrs()
    );
    if let Some(url) = scope.media_url(p.image.as_deref()) {
        let attrs = scope.edit_attrs("image");
        out.push_str(&format!(
            "<img class=\"cms-card__image\" src=\"{}\" alt=\"\" loading=\"lazy\" style=\"border-radius: var(--radius-card);\"{}>",
            escape_html(&url),
            attrs
        ));
    } else {
        out.push_str(&scope.placeholder("div", "cms-card__image", "image"));
    }
    let attrs = scope.edit_attrs("title");
    out.push_str(&format!(
        "<h3 class=\"cms-card__title\" style=\"font-family: var(--font-heading); color: var(--color-primary);\"{}>{}</h3>",
        attrs,
        escape_html(&p.title)
    ));
    if let Some(body) = p.body.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("body");
        out.push_str(&format!(
            "<div class=\"cms-card__body cms-richtext\"{}>{}</div>",
            attrs,
            sanitize_rich_text(body)
        ));
    } else {
        out.push_str(&scope.placeholder("div", "cms-card__body", "body"));
    }
    if let Some(label) = p.link_label.as_deref().filter(|s| !s.is_empty()) {
        let href = safe_href(p.link_href.as_deref().unwrap_or("#"));
        let attrs = scope.edit_attrs("link_label");
        out.push_str(&format!(
            "<a class=\"cms-card__link\" href=\"{}\" style=\"color: var(--color-accent);\"{}>{}</a>",
            href,
            attrs,
            escape_html(label)
        ));
    } else {
        out.push_str(&scope.placeholder("span", "cms-card__link", "link_label"));
    }
    out.push_str(&scope.setting("link_href"));
    out.push_str(&scope.setting("variant"));
    out.push_str("</article>");
    out
}

fn image_text(scope: &mut BlockScope<'_, '_>, p: &ImageTextProps) -> String {
    let mut out = format!(
        "<section class=\"cms-block cms-image-text cms-image-text--{}\" style=\"{}\"{}><div class=\"cms-container cms-image-text__grid\" style=\"display: flex; flex-direction: {}; gap: 2rem; align-items: center; max-width: var(--container-width); margin: 0 auto;\">",
        p.image_position.as_str(),
        section_style(scope),
        scope.block_attrs(),
        match p.image_position {
            crate::blocks::props::ImagePosition::Left => "row",
            crate::blocks::props::ImagePosition::Right => "row-reverse",
        }
    );
    if let Some(url) = scope.media_url(p.image.as_deref()) {
        let attrs = scope.edit_attrs("image");
        out.push_str(&format!(
            "<img class=\"cms-image-text__image\" src=\"{}\" alt=\"{}\" loading=\"lazy\" style=\"border-radius: var(--radius-card); max-width: 50%;\"{}>",
            escape_html(&url),
            escape_html(p.image_alt.as_deref().unwrap_or("")),
            attrs
        ));
    } else {
        out.push_str(&scope.placeholder("div", "cms-image-text__image", "image"));
    }
    out.push_str("<div class=\"cms-image-text__content\">");
    if let Some(heading) = p.heading.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("heading");
        out.push_str(&format!(
            "<h2 style=\"font-family: var(--font-heading); color: var(--color-primary);\"{}>{}</h2>",
            attrs,
            escape_html(heading)
        ));
    } else {
        out.push_str(&scope.placeholder("h2", "cms-image-text__heading", "heading"));
    }
    if let Some(body) = p.body.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("body");
        out.push_str(&format!(
            "<div class=\"cms-richtext\"{}>{}</div>",
            attrs,
            sanitize_rich_text(body)
        ));
    } else {
        out.push_str(&scope.placeholder("div", "cms-richtext", "body"));
    }
    out.push_str("</div></div>");
    out.push_str(&scope.setting("image_alt"));
    out.push_str(&scope.setting("image_position"));
    out.push_str("</section>");
    out
}

fn contact_form(scope: &mut BlockScope<'_, '_>, p: &ContactFormProps) -> String {
    let mut out = format!(
        "<section class=\"cms-block cms-contact-form\" style=\"{} background: var(--color-surface);\"{}><div class=\"cms-container\" style=\"max-width: var(--container-width); margin: 0 auto;\">",
        section_style(scope),
        scope.block_attrs()
    );
    if let Some(title) = p.title.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("title");
        out.push_str(&format!(
            "<h2 style=\"font-family: var(--font-heading); color: var(--color-primary);\"{}>{}</h2>",
            attrs,
            escape_html(title)
        ));
    } else {
        out.push_str(&scope.placeholder("h2", "cms-form__title", "title"));
    }
    if let Some(intro) = p.intro.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("intro");
        out.push_str(&format!("<p class=\"cms-form__intro\"{}>{}</p>", attrs, escape_html(intro)));
    } else {
        out.push_str(&scope.placeholder("p", "cms-form__intro", "intro"));
    }

    out.push_str(&format!(
        "<form class=\"cms-form\" method=\"post\" data-brand=\"{}\">",
        scope.brand()
    ));
    out.push_str("<label>Name<input type=\"text\" name=\"name\" autocomplete=\"name\" required></label>");
    out.push_str("<label>E-Mail<input type=\"email\" name=\"email\" autocomplete=\"email\" required></label>");
    if p.show_phone {
        out.push_str("<label>Telefon<input type=\"tel\" name=\"phone\" autocomplete=\"tel\"></label>");
    }
    out.push_str("<label>Nachricht<textarea name=\"message\" rows=\"5\" required></textarea></label>");
    if let Some(note) = p.privacy_note.as_deref().filter(|s| !s.is_empty()) {
        let attrs = scope.edit_attrs("privacy_note");
        out.push_str(&format!(
            "<p class=\"cms-form__privacy\" style=\"color: var(--color-muted);\"{}>{}</p>",
            attrs,
            escape_html(note)
        ));
    } else {
        out.push_str(&scope.placeholder("p", "cms-form__privacy", "privacy_note"));
    }
    let attrs = scope.edit_attrs("submit_label");
    out.push_str(&format!(
        "<button type=\"submit\" style=\"background: var(--color-primary); color: var(--color-primary-contrast); border-radius: var(--radius-button);\"{}>{}</button>",
        attrs,
        escape_html(&p.submit_label)
    ));
    out.push_str("</form>");
    out.push_str(&scope.setting("show_phone"));
    out.push_str("</div></section>");
    out
}
