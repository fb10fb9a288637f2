use macroquad::prelude::*;
use macroquad_tile_batch::TileSet;

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Level".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/level.json".to_owned());
    let mut level = TileSet::load_level(&path)
        .await
        .expect("Failed to load level");

    loop {
        clear_background(BLACK);

        // spin the anchored tile and let the long strip breathe
        let t = get_time() as f32;
        let mut batch = level.batch();
        if batch.len() > 3 {
            batch.rotate(3, 60.0 * get_frame_time()).ok();
        }
        if !batch.is_empty() {
            batch.resize(0, vec2(300.0 + 100.0 * t.sin(), 32.0)).ok();
        }
        drop(batch);

        level.draw();

        draw_text(
            &format!("FPS: {}  vertices: {}", get_fps(), level.vertices().len()),
            20.0,
            700.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
