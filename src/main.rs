use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

use maze_runner::config::Settings;
use maze_runner::error::AppError;
use maze_runner::game::{Game, Phase};
use maze_runner::spawns::PowerUpKind;
use maze_runner::{Cell, Dir, MazeGenerator, Pos};

const CELL_W: usize = 2;
const INPUT_HOLD: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Enemy,
    Exit,
    Speed,
    Shield,
    Wall,
    Path,
}

impl Glyph {
    fn text(self) -> &'static str {
        match self {
            Glyph::Player => "😃",
            Glyph::Enemy => "👾",
            Glyph::Exit => "🏁",
            Glyph::Speed => "⚡",
            Glyph::Shield => "⭐",
            Glyph::Wall => "██",
            Glyph::Path => "  ",
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct TermCell {
    glyph: Glyph,
    color: Color,
}

const BLANK: TermCell = TermCell {
    glyph: Glyph::Path,
    color: Color::Reset,
};

struct Renderer {
    width: usize,
    height: usize,
    last: Vec<TermCell>,
    last_hud: String,
    last_message: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![BLANK; width * height],
            last_hud: String::new(),
            last_message: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn fit(&mut self, stdout: &mut Stdout, width: usize, height: usize) -> io::Result<()> {
        if width != self.width || height != self.height {
            *self = Renderer::new(width, height);
            stdout.queue(Clear(ClearType::All))?;
        }
        Ok(())
    }
}

/// Terminals report presses and repeats but not releases, so a direction
/// counts as held until its last press is older than [`INPUT_HOLD`].
#[derive(Default)]
struct HeldKey {
    last: Option<(Dir, Instant)>,
}

impl HeldKey {
    fn press(&mut self, dir: Dir, at: Instant) {
        self.last = Some((dir, at));
    }

    fn release(&mut self) {
        self.last = None;
    }

    fn held(&self, now: Instant) -> Option<Dir> {
        self.last
            .filter(|&(_, at)| now.saturating_duration_since(at) <= INPUT_HOLD)
            .map(|(dir, _)| dir)
    }
}

fn main() -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    init_logging(&settings)?;
    info!(?settings, "starting maze runner");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        error!(%err, "terminal loop failed");
    }
    result.map_err(AppError::from)
}

/// Logs go to the `MAZE_LOG` file only; the terminal belongs to the game.
fn init_logging(settings: &Settings) -> Result<(), AppError> {
    let Some(path) = &settings.log_path else {
        return Ok(());
    };
    let file = File::create(path).map_err(|source| AppError::LogFile {
        path: path.clone(),
        source,
    })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, settings: &Settings) -> io::Result<()> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(MazeGenerator::new(), 1, settings.max_level, &mut rng);
    let mut renderer = Renderer::new(game.maze.width, game.maze.height);
    let mut last_tick = Instant::now();
    let mut held = HeldKey::default();
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let tick_time = Duration::from_millis(settings.tick_ms);

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('n')
                        if matches!(game.phase, Phase::LevelComplete | Phase::Won) =>
                    {
                        game.next_level(&mut rng);
                        held.release();
                    }
                    KeyCode::Char('r') if game.phase == Phase::GameOver => {
                        game.restart_level(&mut rng);
                        held.release();
                    }
                    code => {
                        if let Some(dir) = dir_for_key(code) {
                            held.press(dir, Instant::now());
                        }
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_time {
            last_tick = Instant::now();
            game.tick(&mut rng, held.held(last_tick));
        }
        render(stdout, &game, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Char('w') | KeyCode::Char('k') | KeyCode::Up => Some(Dir::Up),
        KeyCode::Char('d') | KeyCode::Char('l') | KeyCode::Right => Some(Dir::Right),
        KeyCode::Char('s') | KeyCode::Char('j') | KeyCode::Down => Some(Dir::Down),
        KeyCode::Char('a') | KeyCode::Char('h') | KeyCode::Left => Some(Dir::Left),
        _ => None,
    }
}

fn render(stdout: &mut Stdout, game: &Game, renderer: &mut Renderer) -> io::Result<()> {
    renderer.fit(stdout, game.maze.width, game.maze.height)?;
    let needed_h = (game.maze.height + 2) as u16;
    let needed_w = (game.maze.width * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
        stdout.queue(Clear(ClearType::All))?;
    }

    let power = game.active_power.map_or("None", PowerUpKind::name);
    let hud = format!(
        "Level: {}/{}  Power-up: {}  Enemies: {}  (q to quit)",
        game.level,
        game.max_level,
        power,
        game.enemies.len()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        let row = renderer.origin_y - 1;
        draw_status(stdout, renderer.origin_x, row, Color::White, &hud)?;
        renderer.last_hud = hud;
    }

    for y in 0..game.maze.height {
        for x in 0..game.maze.width {
            let cell = cell_for(game, Pos::new(x, y));
            let idx = y * game.maze.width + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }

    let message = phase_message(game.phase);
    if renderer.needs_full || message != renderer.last_message {
        let row = renderer.origin_y + game.maze.height as u16;
        draw_status(stdout, renderer.origin_x, row, Color::Yellow, message)?;
        renderer.last_message = message.to_string();
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn draw_status(stdout: &mut Stdout, x: u16, y: u16, color: Color, text: &str) -> io::Result<()> {
    stdout.queue(MoveTo(x, y))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    stdout.queue(ResetColor)?;
    Ok(())
}

fn phase_message(phase: Phase) -> &'static str {
    match phase {
        Phase::Playing => "",
        Phase::LevelComplete => "Level complete! Press n for the next level.",
        Phase::Won => "Game complete! You've mastered all the mazes. Press n to play again.",
        Phase::GameOver => "Caught! Press r to retry the level.",
    }
}

fn cell_for(game: &Game, pos: Pos) -> TermCell {
    if pos == game.player {
        let color = match game.active_power {
            Some(PowerUpKind::Speed) => Color::Yellow,
            Some(PowerUpKind::Invincibility) => Color::Magenta,
            None => Color::Cyan,
        };
        return TermCell {
            glyph: Glyph::Player,
            color,
        };
    }
    if game.enemy_at(pos) {
        return TermCell {
            glyph: Glyph::Enemy,
            color: Color::Red,
        };
    }
    if pos == game.maze.end {
        return TermCell {
            glyph: Glyph::Exit,
            color: Color::Green,
        };
    }
    if let Some(power_up) = game.power_up.filter(|p| !p.collected && p.pos == pos) {
        return match power_up.kind {
            PowerUpKind::Speed => TermCell {
                glyph: Glyph::Speed,
                color: Color::Yellow,
            },
            PowerUpKind::Invincibility => TermCell {
                glyph: Glyph::Shield,
                color: Color::Magenta,
            },
        };
    }
    match game.maze.grid.get(pos) {
        Some(Cell::Wall) => TermCell {
            glyph: Glyph::Wall,
            color: Color::DarkBlue,
        },
        _ => BLANK,
    }
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: TermCell,
) -> io::Result<()> {
    let text = cell.glyph.text();
    let pad = CELL_W.saturating_sub(UnicodeWidthStr::width(text));
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(format!("{text}{:pad$}", "")))?;
    stdout.queue(ResetColor)?;
    Ok(())
}
