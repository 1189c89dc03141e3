//! Presentation: resolved state in, renderable banner out.
//!
//! [`render`] is a pure mapping from a [`RenderInput`] to a [`RenderedOutput`].
//! It reads nothing but its input, mutates none of it, and calling it again
//! with the same input yields an equal value. The output is plain data; turn
//! it into HTML with [`RenderedOutput::to_markup`] or a custom
//! [`MarkupEngine`].
//!
//! The one interactive element is the [`AcceptControl`]. Its [`ControlId`] is
//! minted by the lifecycle controller, which keeps only the latest one
//! attached: a re-render fully replaces the previous output, and activating a
//! control from a replaced output is ignored.
//!
//! ## Key Types
//!
//! - [`RenderedOutput`]: theme, palette, text, links and the accept control
//! - [`PaletteSet`]: one [`Palette`] per effective theme
//! - [`MarkupEngine`]: MiniJinja template producing the banner markup

mod markup;
mod output;
mod palette;

pub use markup::{MarkupEngine, BANNER_TEMPLATE, STYLESHEET};
pub use output::{AcceptControl, ControlId, Link, RenderInput, RenderedOutput};
pub use palette::{Palette, PaletteSet};

/// Builds the banner for `input`.
pub fn render(input: &RenderInput<'_>) -> RenderedOutput {
    RenderedOutput::from_input(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{TranslationEntry, TranslationTable};
    use crate::preference::EffectiveTheme;

    fn links() -> Vec<Link> {
        vec![
            Link::new("Privacy Policy", "https://www.tehveli.com/privacy"),
            Link::new("Terms and Conditions", "https://www.tehveli.com/terms"),
        ]
    }

    #[test]
    fn test_render_maps_input() {
        let text = TranslationTable::builtin().lookup(Some("es"));
        let links = links();
        let palette = Palette::dark();
        let output = render(&RenderInput {
            theme: EffectiveTheme::Dark,
            palette: &palette,
            locale: text.locale,
            text: text.entry,
            links: &links,
            control: ControlId::new(3),
        });

        assert_eq!(output.theme(), EffectiveTheme::Dark);
        assert_eq!(output.palette(), &palette);
        assert_eq!(output.locale(), "es");
        assert_eq!(output.message(), "Usamos cookies para mejorar su experiencia.");
        assert_eq!(output.button_label(), "Aceptar");
        assert_eq!(output.links(), links.as_slice());
        assert_eq!(output.accept_control().id(), ControlId::new(3));
        assert_eq!(output.accept_control().label(), "Aceptar");
    }

    #[test]
    fn test_render_is_deterministic() {
        let text = TranslationEntry::new("m", "b");
        let links = links();
        let palette = Palette::light();
        let input = RenderInput {
            theme: EffectiveTheme::Light,
            palette: &palette,
            locale: "en",
            text: &text,
            links: &links,
            control: ControlId::new(1),
        };
        assert_eq!(render(&input), render(&input));
    }

    #[test]
    fn test_apply_theme_keeps_content_and_control() {
        let text = TranslationEntry::new("m", "b");
        let links = links();
        let light = Palette::light();
        let mut output = render(&RenderInput {
            theme: EffectiveTheme::Light,
            palette: &light,
            locale: "en",
            text: &text,
            links: &links,
            control: ControlId::new(9),
        });

        let dark = Palette::dark();
        output.apply_theme(EffectiveTheme::Dark, &dark);

        assert_eq!(output.theme(), EffectiveTheme::Dark);
        assert_eq!(output.palette(), &dark);
        assert_eq!(output.message(), "m");
        assert_eq!(output.accept_control().id(), ControlId::new(9));
    }

    #[test]
    fn test_control_ids_advance() {
        let id = ControlId::new(1);
        assert_eq!(id.next(), ControlId::new(2));
        assert_eq!(id.next().get(), 2);
    }
}
