//! Sprite URL templates. The core never fetches these; they are handed to
//! the presentation layer as plain strings.

const SPRITE_BASE: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

pub fn sprite_url(id: &str) -> String {
    format!("{SPRITE_BASE}/{id}.png")
}

pub fn artwork_url(id: &str) -> String {
    format!("{SPRITE_BASE}/other/official-artwork/{id}.png")
}

pub fn animated_sprite_url(id: &str) -> String {
    format!("{SPRITE_BASE}/versions/generation-v/black-white/animated/{id}.gif")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert!(sprite_url("25").ends_with("/sprites/pokemon/25.png"));
        assert!(artwork_url("25").ends_with("/other/official-artwork/25.png"));
        assert!(animated_sprite_url("25").ends_with("/black-white/animated/25.gif"));
    }
}
