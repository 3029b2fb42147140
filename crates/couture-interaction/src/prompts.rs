//! Prompt templates for the generation backend.
//!
//! Templates are rendered with minijinja so that the season, occasion and
//! outfit text are interpolated in one place.

use minijinja::{Environment, context};

use couture_core::generation::GenerationError;
use couture_core::outfit::VARIATIONS_PER_CATEGORY;

const SUGGEST_STANDARD: &str = "suggest_standard";
const SUGGEST_IN_DEPTH: &str = "suggest_in_depth";
const TRY_ON: &str = "try_on";

const SUGGEST_STANDARD_TEMPLATE: &str = r#"You are a senior fashion couturier with two decades of experience dressing public figures, at home in both classic tailoring and current trends.

Task: study the full-body photograph of the client. Read their build, the setting of the photo and any style cues it gives away, then run a personal style consultation.

Prepare three style portfolios for the '{{ season }}' season and a '{{ occasion }}' occasion:
1. Formal: sharp, confident and refined.
2. Casual: relaxed, polished and comfortable.
3. Stylish: current, bold and expressive.

Rules:
- Every portfolio contains exactly {{ variations }} complete outfit compositions.
- Each composition carries a stylist's rationale covering silhouette, fabric pairing, colour choices and why it suits the occasion.
- Each composition lists its garments precisely (for example "Charcoal Pinstripe Wool Trousers", "Ivory Silk Camisole").
- Answer with a single JSON value that follows the supplied schema and nothing else."#;

const SUGGEST_IN_DEPTH_TEMPLATE: &str = r#"You are a personal stylist with fifteen years of experience and a research-driven method: every recommendation follows from a close reading of the client.

Task: from the full-body photograph, work out which cuts, fabrics, colours and shapes will work with the client's build, likely skin tone and the setting of the photo.

For the '{{ season }}' season and a '{{ occasion }}' occasion, write three style dossiers:
1. Formal: authoritative, precise and memorable.
2. Casual: effortless on the surface, carefully composed underneath.
3. Stylish: contemporary, on-trend and personal.

Rules:
- Every dossier contains exactly {{ variations }} outfit compositions.
- Each composition's description explains how the silhouette works with the client's build, why the palette suits them and the occasion, and how the fabrics play off each other.
- It also names footwear, jewellery, bags and belts, gives one concrete styling tip, and suggests the kind of store or brand where similar pieces can be found.
- The garment list names every item with descriptive detail ("High-waisted wide-leg linen trousers in sand beige", not "pants").
- Answer with a single JSON value that follows the supplied schema and nothing else."#;

const TRY_ON_TEMPLATE: &str = r#"Produce a photorealistic image with a strict 1:1 aspect ratio. The output must be a perfect square.

Dress the person in the input image in this outfit: "{{ outfit }}".

1. ASPECT RATIO: the image is square, without exception.
2. PRESERVE THE PERSON: keep the face, expression, head position, hair and skin tone exactly as they are. Keep body shape, size and posture unchanged.
3. FABRIC REALISM: render every garment with its real texture and drape, following the pose.
4. LIGHTING: match the direction, softness and colour temperature of the original light, including the shadows the new clothes cast and receive.
5. INTEGRATION: the clothing must follow the body's contours and blend into the scene, never looking pasted on.
6. BACKGROUND: keep the original background untouched.

Produce {{ candidates }} high-quality variations, each at a 1:1 aspect ratio."#;

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(SUGGEST_STANDARD, SUGGEST_STANDARD_TEMPLATE)?;
    env.add_template(SUGGEST_IN_DEPTH, SUGGEST_IN_DEPTH_TEMPLATE)?;
    env.add_template(TRY_ON, TRY_ON_TEMPLATE)?;
    Ok(env)
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, GenerationError> {
    let env = environment().map_err(|e| GenerationError::Prompt(e.to_string()))?;
    env.get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|e| GenerationError::Prompt(e.to_string()))
}

/// Consultation prompt; `in_depth` selects the long-form dossier.
pub fn suggestion_prompt(
    season: &str,
    occasion: &str,
    in_depth: bool,
) -> Result<String, GenerationError> {
    let name = if in_depth {
        SUGGEST_IN_DEPTH
    } else {
        SUGGEST_STANDARD
    };
    render(
        name,
        context! {
            season => season,
            occasion => occasion,
            variations => VARIATIONS_PER_CATEGORY,
        },
    )
}

/// Virtual try-on prompt for one outfit description.
pub fn try_on_prompt(outfit_description: &str, candidates: usize) -> Result<String, GenerationError> {
    render(
        TRY_ON,
        context! {
            outfit => outfit_description,
            candidates => candidates,
        },
    )
}
