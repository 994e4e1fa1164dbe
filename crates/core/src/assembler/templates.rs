//! Generated resource-pack JSON documents.
//!
//! Player models are built from cuboid elements whose UVs follow the
//! standard skin texture layout: each box unwraps as
//! `[right][front][left][back]` with `[top][bottom]` above, anchored at a
//! per-limb origin. Modern skins are 64x64 with dedicated left-limb
//! regions; legacy 64x32 skins mirror the right limbs instead. Slim skins
//! shave the arms from 4px to 3px wide.

use serde_json::{json, Value};

use crate::resolver::types::SkinVariant;

/// Resource pack format for 1.21.4.
pub const PACK_FORMAT: u32 = 46;

/// Namespace the pack's own assets live under.
pub const PACK_NAMESPACE: &str = "skin_pack";

pub fn pack_mcmeta() -> Value {
    json!({
        "pack": {
            "pack_format": PACK_FORMAT,
            "description": "Generated player skin pack"
        }
    })
}

/// One cuboid of the player model, in skin texture pixels.
struct Limb {
    /// Lower corner in pixels, origin at the player's feet, x centered on 8px.
    from: [f64; 3],
    /// Box size in pixels (width, height, depth).
    size: [f64; 3],
    /// UV origin of the limb's unwrap region.
    uv: (f64, f64),
    /// Mirror the side faces (legacy left limbs reuse the right region).
    mirror: bool,
}

impl Limb {
    fn new(from: [f64; 3], size: [f64; 3], uv: (f64, f64)) -> Self {
        Self {
            from,
            size,
            uv,
            mirror: false,
        }
    }

    fn mirrored(mut self) -> Self {
        self.mirror = true;
        self
    }

    /// Emit the cuboid as a model element. `scale` maps texture pixels to
    /// the 0..16 UV space, `px` maps skin pixels to model units.
    fn element(&self, scale: (f64, f64), px: f64) -> Value {
        let (u, v) = self.uv;
        let [w, h, d] = self.size;

        // Model space: x centered at 8, y from the ground up.
        let from = [8.0 + self.from[0] * px, self.from[1] * px, 8.0 - d * px / 2.0];
        let to = [from[0] + w * px, from[1] + h * px, from[2] + d * px];

        let face = |x1: f64, y1: f64, x2: f64, y2: f64, flip: bool| -> Value {
            let (a, b) = if flip { (x2, x1) } else { (x1, x2) };
            json!({
                "uv": [a * scale.0, y1 * scale.1, b * scale.0, y2 * scale.1],
                "texture": "#skin"
            })
        };

        json!({
            "from": from,
            "to": to,
            "faces": {
                "up": face(u + d, v, u + d + w, v + d, self.mirror),
                "down": face(u + d + w, v, u + d + 2.0 * w, v + d, self.mirror),
                "west": face(u, v + d, u + d, v + d + h, self.mirror),
                "north": face(u + d, v + d, u + d + w, v + d + h, self.mirror),
                "east": face(u + d + w, v + d, u + 2.0 * d + w, v + d + h, self.mirror),
                "south": face(u + 2.0 * d + w, v + d, u + 2.0 * d + 2.0 * w, v + d + h, self.mirror)
            }
        })
    }
}

/// The limb set for a model variant. Positions are in skin pixels with x
/// measured from the player's center.
fn limbs(variant: SkinVariant) -> Vec<Limb> {
    let arm_w = match variant {
        SkinVariant::Slim => 3.0,
        _ => 4.0,
    };

    let mut limbs = vec![
        // Head
        Limb::new([-4.0, 24.0, 0.0], [8.0, 8.0, 8.0], (0.0, 0.0)),
        // Body
        Limb::new([-4.0, 12.0, 0.0], [8.0, 12.0, 4.0], (16.0, 16.0)),
        // Right arm
        Limb::new([-4.0 - arm_w, 12.0, 0.0], [arm_w, 12.0, 4.0], (40.0, 16.0)),
        // Right leg
        Limb::new([-4.0, 0.0, 0.0], [4.0, 12.0, 4.0], (0.0, 16.0)),
    ];

    match variant {
        SkinVariant::Old => {
            // 64x32 has no left-limb regions, mirror the right ones
            limbs.push(Limb::new([4.0, 12.0, 0.0], [4.0, 12.0, 4.0], (40.0, 16.0)).mirrored());
            limbs.push(Limb::new([0.0, 0.0, 0.0], [4.0, 12.0, 4.0], (0.0, 16.0)).mirrored());
        }
        _ => {
            limbs.push(Limb::new([4.0, 12.0, 0.0], [arm_w, 12.0, 4.0], (32.0, 48.0)));
            limbs.push(Limb::new([0.0, 0.0, 0.0], [4.0, 12.0, 4.0], (16.0, 48.0)));
        }
    }

    limbs
}

/// Build the item model document for one player.
pub fn model_definition(name: &str, variant: SkinVariant) -> Value {
    // Resource locations must be lowercase
    let texture_ref = format!("{}:item/{}", PACK_NAMESPACE, name.to_lowercase());

    let texture_height = match variant {
        SkinVariant::Old => 32.0,
        _ => 64.0,
    };
    // UVs live in a fixed 0..16 space regardless of texture resolution
    let scale = (16.0 / 64.0, 16.0 / texture_height);

    // Half a model unit per skin pixel, so the 32px figure fills the cube
    let px = 0.5;

    let elements: Vec<Value> = limbs(variant)
        .iter()
        .map(|l| l.element(scale, px))
        .collect();

    json!({
        "texture_size": [64, texture_height as u32],
        "textures": {
            "skin": texture_ref,
            "particle": texture_ref
        },
        "elements": elements,
        "display": {
            "gui": {
                "rotation": [20.0, -35.0, 0.0],
                "translation": [0.0, -2.5, 0.0],
                "scale": [0.65, 0.65, 0.65]
            },
            "head": {
                "translation": [0.0, -14.5, 0.0],
                "scale": [1.0, 1.0, 1.0]
            },
            "thirdperson_righthand": {
                "rotation": [0.0, 0.0, 0.0],
                "translation": [0.0, 0.0, 0.0],
                "scale": [0.5, 0.5, 0.5]
            },
            "ground": {
                "translation": [0.0, 2.0, 0.0],
                "scale": [0.5, 0.5, 0.5]
            },
            "fixed": {
                "scale": [0.8, 0.8, 0.8]
            }
        }
    })
}

/// Build the item definition that swaps the base item's model for a player
/// model when the item is renamed to that player's name, falling back to the
/// vanilla model otherwise.
pub fn item_index(names: &[String], item: &str) -> Value {
    let cases: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "when": name.to_lowercase(),
                "model": {
                    "type": "minecraft:model",
                    "model": format!("{}:item/{}", PACK_NAMESPACE, name.to_lowercase())
                }
            })
        })
        .collect();

    json!({
        "model": {
            "type": "minecraft:select",
            "property": "minecraft:component",
            "component": "minecraft:custom_name",
            "cases": cases,
            "fallback": {
                "type": "minecraft:model",
                "model": format!("minecraft:item/{}", item)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_mcmeta_format() {
        let mcmeta = pack_mcmeta();
        assert_eq!(mcmeta["pack"]["pack_format"], PACK_FORMAT);
    }

    #[test]
    fn test_model_references_player_texture() {
        let model = model_definition("notch", SkinVariant::Normal);
        assert_eq!(model["textures"]["skin"], "skin_pack:item/notch");
        assert_eq!(model["texture_size"][1], 64);
    }

    #[test]
    fn test_model_has_six_limbs() {
        for variant in [SkinVariant::Normal, SkinVariant::Slim, SkinVariant::Old] {
            let model = model_definition("notch", variant);
            assert_eq!(model["elements"].as_array().unwrap().len(), 6);
        }
    }

    #[test]
    fn test_slim_arms_are_narrower() {
        let slim = model_definition("notch", SkinVariant::Slim);
        let normal = model_definition("notch", SkinVariant::Normal);

        let arm_width = |model: &Value| -> f64 {
            let arm = &model["elements"][2];
            arm["to"][0].as_f64().unwrap() - arm["from"][0].as_f64().unwrap()
        };

        assert_eq!(arm_width(&normal), 2.0);
        assert_eq!(arm_width(&slim), 1.5);
    }

    #[test]
    fn test_old_variant_uses_legacy_texture_size() {
        let model = model_definition("notch", SkinVariant::Old);
        assert_eq!(model["texture_size"][1], 32);

        // Mirrored left arm reuses the right arm's UV region
        let left_arm = &model["elements"][4];
        let uv = left_arm["faces"]["north"]["uv"].as_array().unwrap();
        // Mirror flips the horizontal coordinates
        assert!(uv[0].as_f64().unwrap() > uv[2].as_f64().unwrap());
    }

    #[test]
    fn test_item_index_cases_and_fallback() {
        let names = vec!["Notch".to_string(), "jeb_".to_string()];
        let index = item_index(&names, "carved_pumpkin");

        let cases = index["model"]["cases"].as_array().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0]["when"], "notch");
        assert_eq!(cases[0]["model"]["model"], "skin_pack:item/notch");
        assert_eq!(
            index["model"]["fallback"]["model"],
            "minecraft:item/carved_pumpkin"
        );
    }
}
