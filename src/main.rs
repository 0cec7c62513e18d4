use ggez::{
    event,
    graphics::{self, Color, DrawMode, Mesh},
    input::keyboard::{KeyCode, KeyInput},
    Context, GameResult,
};
use sonar_shoal::{FishState, InputState, PredatorState, SimConfig, SimEvent, World};
use tracing::info;

/// Presentation layer: polls the keyboard, ticks the world, draws primitive
/// shapes and a text HUD. All game logic lives in the library.
struct GameState {
    world: World,
}

impl GameState {
    fn new() -> GameResult<GameState> {
        let world = World::new(SimConfig::default())
            .map_err(|e| ggez::GameError::CustomError(e.to_string()))?;
        Ok(GameState { world })
    }
}

impl event::EventHandler<ggez::GameError> for GameState {
    fn update(&mut self, ctx: &mut Context) -> GameResult {
        // Tuning assumes delta ~= 1.0 at 60Hz.
        let delta = ctx.time.delta().as_secs_f32() * 60.0;

        self.world.set_input(InputState {
            turn_left: ctx.keyboard.is_key_pressed(KeyCode::A),
            turn_right: ctx.keyboard.is_key_pressed(KeyCode::D),
            thrust: ctx.keyboard.is_key_pressed(KeyCode::W),
            brake: ctx.keyboard.is_key_pressed(KeyCode::S),
        });

        self.world.tick(delta);

        for event in self.world.drain_events() {
            match event {
                SimEvent::PlayerHit { lives_remaining } => {
                    info!(lives_remaining, "hit by predator")
                }
                SimEvent::GameOver => info!("game over, press R to restart"),
                SimEvent::Won => info!("shoal cleared, you win"),
                _ => {}
            }
        }
        Ok(())
    }

    fn key_down_event(&mut self, _ctx: &mut Context, input: KeyInput, repeated: bool) -> GameResult {
        if repeated {
            return Ok(());
        }
        match input.keycode {
            Some(KeyCode::M) => self.world.on_fire_input(),
            Some(KeyCode::E) => self.world.on_consume_input(),
            Some(KeyCode::R) => {
                if self.world.is_game_over() || self.world.is_won() {
                    self.world.restart();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        let mut canvas = graphics::Canvas::from_frame(ctx, Color::from_rgb(8, 24, 58));

        // Shoal
        for fish in self.world.fishes() {
            let color = match fish.state {
                FishState::Follow { .. } => Color::new(1.0, 0.85, 0.2, 1.0),
                FishState::Idle => Color::new(0.4, 0.8, 1.0, 1.0),
            };
            let body = Mesh::new_circle(
                ctx,
                DrawMode::fill(),
                [fish.position.x, fish.position.y],
                5.0,
                0.1,
                color,
            )?;
            canvas.draw(&body, graphics::DrawParam::default());
        }

        // Active sonar pulses
        for pulse in self.world.pulses().iter().filter(|p| p.active) {
            let ring = Mesh::new_circle(
                ctx,
                DrawMode::stroke(2.0),
                [pulse.position.x, pulse.position.y],
                8.0 + pulse.age_frames as f32 * 0.2,
                0.1,
                Color::new(0.7, 1.0, 1.0, 0.6),
            )?;
            canvas.draw(&ring, graphics::DrawParam::default());
        }

        // Predators
        for predator in self.world.predators() {
            let color = match predator.state {
                PredatorState::Hunting => Color::new(0.9, 0.2, 0.2, 1.0),
                PredatorState::Wandering => Color::new(0.6, 0.3, 0.3, 1.0),
            };
            let body = Mesh::new_circle(
                ctx,
                DrawMode::fill(),
                [predator.position.x, predator.position.y],
                self.world.config().predator_radius * 0.5,
                0.1,
                color,
            )?;
            canvas.draw(&body, graphics::DrawParam::default());
        }

        // Player with a heading tick
        let player = self.world.player();
        let body = Mesh::new_circle(
            ctx,
            DrawMode::fill(),
            [player.position.x, player.position.y],
            self.world.config().player_radius * 0.4,
            0.1,
            Color::WHITE,
        )?;
        canvas.draw(&body, graphics::DrawParam::default());
        let nose = player.heading() * (self.world.config().player_radius * 0.8);
        let heading_line = Mesh::new_line(
            ctx,
            &[
                [player.position.x, player.position.y],
                [player.position.x + nose.x, player.position.y + nose.y],
            ],
            2.0,
            Color::WHITE,
        )?;
        canvas.draw(&heading_line, graphics::DrawParam::default());

        // HUD
        let hud = graphics::Text::new(format!(
            "Score: {}   Lives: {}   Sonar: {}   Fish left: {}",
            self.world.score(),
            self.world.lives_remaining(),
            self.world.echo_charges(),
            self.world.active_fish_count(),
        ));
        canvas.draw(
            &hud,
            graphics::DrawParam::default()
                .dest([15.0, 15.0])
                .color(Color::WHITE),
        );

        if self.world.is_game_over() {
            let text = graphics::Text::new("GAME OVER - press R to restart");
            canvas.draw(
                &text,
                graphics::DrawParam::default()
                    .dest([860.0, 520.0])
                    .color(Color::new(1.0, 0.3, 0.3, 1.0)),
            );
        } else if self.world.is_won() {
            let text = graphics::Text::new("SHOAL CLEARED - press R to restart");
            canvas.draw(
                &text,
                graphics::DrawParam::default()
                    .dest([850.0, 520.0])
                    .color(Color::new(0.3, 1.0, 0.5, 1.0)),
            );
        }

        canvas.finish(ctx)?;
        Ok(())
    }
}

fn main() -> GameResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cb = ggez::ContextBuilder::new("sonar_shoal", "you")
        .window_setup(ggez::conf::WindowSetup::default().title("Sonar Shoal"))
        .window_mode(ggez::conf::WindowMode::default().dimensions(1920.0, 1080.0));

    let (ctx, event_loop) = cb.build()?;
    let state = GameState::new()?;
    event::run(ctx, event_loop, state)
}
