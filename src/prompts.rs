//! Prompt construction.
//!
//! A [`PromptSpec`] is four plain functions of an [`InputItem`]. The title is
//! derived locally; the other three prompts are sent to the completion service.

use crate::types::InputItem;

/// Pure prompt builder for one sub-generation.
pub type PromptFn = fn(&InputItem) -> String;

/// The four prompt builders used for one article.
#[derive(Clone, Copy)]
pub struct PromptSpec {
    pub title: PromptFn,
    pub meta_title: PromptFn,
    pub meta_description: PromptFn,
    pub body: PromptFn,
}

impl std::fmt::Debug for PromptSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptSpec").finish_non_exhaustive()
    }
}

impl Default for PromptSpec {
    fn default() -> Self {
        Self {
            title: keyword_title,
            meta_title: seo_meta_title_prompt,
            meta_description: seo_meta_description_prompt,
            body: inclusive_education_article_prompt,
        }
    }
}

/// Use the keyword itself as the article title.
pub fn keyword_title(item: &InputItem) -> String {
    item.keyword.clone()
}

pub fn seo_meta_title_prompt(item: &InputItem) -> String {
    format!(
        "Genera un meta-título SEO para la keyword \"{}\" con menos de 57 caracteres y sin separadores.",
        item.keyword
    )
}

pub fn seo_meta_description_prompt(item: &InputItem) -> String {
    format!(
        "Genera un parrafo de metadescripción SEO de menos de 155 caracteres sobre \"{}\".",
        item.keyword
    )
}

pub fn inclusive_education_article_prompt(item: &InputItem) -> String {
    format!(
        "Somos una página web que escribe artículos sobre inclusión educativa. \
         Escribimos los artículos con un tono cercano y profesional.\n\
         Escribe artículo web atrayente, optimizado para SEO y en formato markdown sobre {}. \
         Con introducción, y encabezados. Con palabras en negrita.",
        item.keyword
    )
}
