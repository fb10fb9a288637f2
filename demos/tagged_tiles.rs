use macroquad::prelude::*;
use macroquad_tile_batch::{
    SubTextureTable, TextureRule, Tile, TileDesc, TileExtension, TileSet, TileVertex,
};

fn window_conf() -> Conf {
    Conf {
        window_title: "Tagged Tiles".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

/// Tiles the player can toggle; closed ones are drawn dimmed.
#[derive(Debug, Clone)]
struct Switch {
    on: bool,
}

impl TileExtension for Switch {
    fn kind(&self) -> &'static str {
        "switch"
    }

    fn decorate(&self, _tile: &Tile, vertices: &mut [TileVertex]) {
        if !self.on {
            for v in vertices {
                v.color = Color::new(v.color.r * 0.3, v.color.g * 0.3, v.color.b * 0.3, v.color.a);
            }
        }
    }
}

fn checker_atlas() -> Texture2D {
    let mut image = Image::gen_image_color(64, 16, WHITE);
    for x in 0..64u32 {
        for y in 0..16u32 {
            let shade = if (x / 4 + y / 4) % 2 == 0 { 1.0 } else { 0.7 };
            let base = [RED, GREEN, BLUE, YELLOW][(x / 16) as usize];
            image.set_pixel(x, y, Color::new(base.r * shade, base.g * shade, base.b * shade, 1.0));
        }
    }
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Nearest);
    texture
}

fn build() -> anyhow::Result<TileSet> {
    let texture = checker_atlas();
    let atlas = SubTextureTable::uniform(texture.size(), 4);
    let mut set = TileSet::with_atlas(texture, atlas);

    set.with_batch(|set| {
        for i in 0..40 {
            let position = vec2(40.0 + (i % 10) as f32 * 110.0, 60.0 + (i / 10) as f32 * 110.0);
            let desc = TileDesc::textured(position, vec2(96.0, 96.0), i % 4, TextureRule::RepeatTexture)
                .with_scale(vec2(2.0, 2.0));
            if i % 3 == 0 {
                set.add_with_extension(desc, Switch { on: false })?;
            } else {
                set.add(desc)?;
            }
        }
        Ok(())
    })?;
    Ok(set)
}

async fn run() -> anyhow::Result<()> {
    let mut set = build()?;

    loop {
        clear_background(BLACK);

        if is_mouse_button_pressed(MouseButton::Left) {
            let mouse = Vec2::from(mouse_position());
            let hit = (0..set.len()).find(|&i| set.tile(i).is_ok_and(|t| t.contains(mouse)));
            if let Some(i) = hit {
                let mut batch = set.batch();
                if let Some(switch) = batch.derived_mut::<Switch>(i)? {
                    switch.on = !switch.on;
                    log::info!("switch {i} is now {}", if switch.on { "on" } else { "off" });
                    batch.rebuild(i)?;
                } else {
                    let next = (batch.tile(i)?.sub_texture_index().unwrap_or(0) + 1) % 4;
                    batch.change_texture_rect(i, next)?;
                }
            }
        }

        set.draw();
        draw_text("click a tile", 20.0, 30.0, 32.0, WHITE);
        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    if let Err(e) = run().await {
        log::error!("{e:#}");
    }
}
