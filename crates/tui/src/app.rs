use std::{cmp, io, thread, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fleet_core::{AppConfig, Fleet, Vehicle, VehicleType};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 96;
const DEMO_FILE: &str = "demo_fleet.csv";

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
    primary_fg: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            primary_fg: Color::White,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    AddVehicle,
    JourneyDistance,
    RefuelAmount,
    SearchType,
    Occupancy { passengers: bool, cargo: bool },
}

impl PromptKind {
    fn title(self) -> &'static str {
        match self {
            PromptKind::AddVehicle => "Add Vehicle",
            PromptKind::JourneyDistance => "Start Journeys",
            PromptKind::RefuelAmount => "Refuel Fleet",
            PromptKind::SearchType => "Search by Type",
            PromptKind::Occupancy { .. } => "Passengers and Cargo",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            PromptKind::AddVehicle => "Type,id,model,max_speed[,altitude|sail]",
            PromptKind::JourneyDistance => "Distance in km",
            PromptKind::RefuelAmount => "Litres per vehicle",
            PromptKind::SearchType => "Vehicle type (empty shows all)",
            PromptKind::Occupancy {
                passengers: true,
                cargo: true,
            } => "passengers,cargo kg (blank keeps current)",
            PromptKind::Occupancy {
                passengers: true, ..
            } => "passengers (blank keeps current)",
            PromptKind::Occupancy { .. } => "cargo kg (blank keeps current)",
        }
    }
}

#[derive(Debug, Clone)]
struct PromptModal {
    kind: PromptKind,
    input: String,
    cursor: usize,
    target: Option<String>,
}

impl PromptModal {
    fn new(kind: PromptKind, initial: String) -> Self {
        let cursor = initial.len();
        Self {
            kind,
            input: initial,
            cursor,
            target: None,
        }
    }

    /// Prompt for the passengers and cargo of `vehicle`, or `None` when it
    /// carries neither.
    fn occupancy(vehicle: &Vehicle) -> Option<Self> {
        let passengers = vehicle.passenger_capacity().is_some();
        let cargo = vehicle.cargo_capacity().is_some();
        if !passengers && !cargo {
            return None;
        }
        let mut prompt = Self::new(PromptKind::Occupancy { passengers, cargo }, String::new());
        prompt.target = Some(vehicle.id().to_string());
        Some(prompt)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_INPUT_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    fn value(&self) -> &str {
        self.input.trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Detail,
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum View {
    All,
    Type(String),
    NeedingMaintenance,
}

impl View {
    fn title(&self) -> String {
        match self {
            View::All => "Vehicles".to_string(),
            View::Type(name) => format!("Vehicles · type {name}"),
            View::NeedingMaintenance => "Vehicles · needing maintenance".to_string(),
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front end over a single in-memory fleet.
pub struct FleetApp {
    fleet: Fleet,
    config: AppConfig,
    state: UiState,
    prompt: Option<PromptModal>,
    theme: Theme,
}

impl FleetApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            fleet: Fleet::new(),
            config,
            state: UiState::default(),
            prompt: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.load_fleet();

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result: Result<()> = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(err.into());
            }
            if self.state.should_quit {
                break Ok(());
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => self.handle_input(event),
                Some(AppEvent::Tick) => {}
                None => break Ok(()),
            }
        };

        restore_terminal(&mut terminal)?;
        result
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        let outcome = if self.prompt.is_some() {
            self.handle_prompt_key(key)
        } else {
            self.handle_browse_key(key)
        };
        if let Err(err) = outcome {
            error!("{err:#}");
            self.state.set_status(format!("Error: {err:#}"));
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        if !(key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT) {
            return Ok(());
        }
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.visible_len();
                self.state.move_cursor(1, len);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let len = self.visible_len();
                self.state.move_cursor(-1, len);
            }
            KeyCode::Home => self.state.cursor = 0,
            KeyCode::End => self.state.cursor = self.visible_len().saturating_sub(1),
            KeyCode::Char('a') => self.open_prompt(PromptKind::AddVehicle, String::new()),
            KeyCode::Char('x') => self.remove_selected()?,
            KeyCode::Char('p') => {
                let vehicle = self.selected().ok_or_else(|| anyhow!("no vehicle selected"))?;
                let prompt = PromptModal::occupancy(vehicle).ok_or_else(|| {
                    anyhow!("{} carries neither passengers nor cargo", vehicle.id())
                })?;
                self.prompt = Some(prompt);
            }
            KeyCode::Char('d') => self.run_demo()?,
            KeyCode::Char('g') => {
                let distance = self.config.default_distance.to_string();
                self.open_prompt(PromptKind::JourneyDistance, distance);
            }
            KeyCode::Char('f') => {
                let amount = self.config.default_refuel.to_string();
                self.open_prompt(PromptKind::RefuelAmount, amount);
            }
            KeyCode::Char('m') => {
                let serviced = self.fleet.maintain_all();
                self.state
                    .set_status(format!("Maintenance performed on {serviced} vehicle(s)"));
            }
            KeyCode::Char('r') => {
                self.state.pane = match self.state.pane {
                    Pane::Detail => Pane::Report,
                    Pane::Report => Pane::Detail,
                };
            }
            KeyCode::Char('/') => {
                let current = match &self.state.view {
                    View::Type(name) => name.clone(),
                    _ => String::new(),
                };
                self.open_prompt(PromptKind::SearchType, current);
            }
            KeyCode::Char('n') => {
                self.set_view(View::NeedingMaintenance);
                let due = self.visible_len();
                self.state
                    .set_status(format!("{due} vehicle(s) need maintenance"));
            }
            KeyCode::Esc => {
                self.set_view(View::All);
                self.state.set_status("Showing all vehicles".to_string());
            }
            KeyCode::Char('1') => {
                self.fleet.sort_by_efficiency();
                self.state
                    .set_status("Sorted by fuel efficiency".to_string());
            }
            KeyCode::Char('2') => {
                self.fleet.sort_by_max_speed();
                self.state.set_status("Sorted by max speed".to_string());
            }
            KeyCode::Char('3') => {
                self.fleet.sort_by_model();
                self.state.set_status("Sorted by model".to_string());
            }
            KeyCode::Char('s') => self.save_fleet()?,
            KeyCode::Char('l') => self.load_fleet(),
            _ => {}
        }
        Ok(())
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                self.state.set_status("Cancelled".to_string());
            }
            KeyCode::Enter => {
                let kind = prompt.kind;
                let value = prompt.value().to_string();
                let target = prompt.target.take();
                self.prompt = None;
                self.submit_prompt(kind, &value, target)?;
            }
            KeyCode::Left => prompt.move_cursor(-1),
            KeyCode::Right => prompt.move_cursor(1),
            KeyCode::Home => prompt.cursor = 0,
            KeyCode::End => prompt.cursor = prompt.input.len(),
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Delete => prompt.delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    prompt.insert(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_prompt(&mut self, kind: PromptKind, value: &str, target: Option<String>) -> Result<()> {
        match kind {
            PromptKind::AddVehicle => {
                let vehicle = parse_vehicle_form(value)?;
                let label = format!("{} {}", vehicle.type_name(), vehicle.id());
                let follow_up = PromptModal::occupancy(&vehicle);
                self.fleet.add(vehicle)?;
                self.state.set_status(format!("Added {label}"));
                self.prompt = follow_up;
            }
            PromptKind::Occupancy { passengers, cargo } => {
                let id = target.ok_or_else(|| anyhow!("no vehicle to load"))?;
                let load = parse_occupancy(value, passengers, cargo)?;
                self.apply_occupancy(&id, load)?;
                self.state.set_status(format!("Updated load of {id}"));
            }
            PromptKind::JourneyDistance => {
                let distance = parse_amount(value, self.config.default_distance)?;
                let report = self.fleet.start_all_journeys(distance);
                self.state.set_status(report.summary("Journeys"));
            }
            PromptKind::RefuelAmount => {
                let amount = parse_amount(value, self.config.default_refuel)?;
                let report = self.fleet.refuel_all(amount);
                self.state.set_status(report.summary("Refuel"));
            }
            PromptKind::SearchType => {
                if value.is_empty() {
                    self.set_view(View::All);
                    self.state.set_status("Showing all vehicles".to_string());
                } else {
                    let name = value.to_string();
                    let matches = self.fleet.search(&name).len();
                    self.set_view(View::Type(name.clone()));
                    self.state
                        .set_status(format!("{matches} vehicle(s) of type {name}"));
                }
            }
        }
        Ok(())
    }

    fn open_prompt(&mut self, kind: PromptKind, initial: String) {
        self.prompt = Some(PromptModal::new(kind, initial));
    }

    /// Restore passengers and cargo in one step; on failure the vehicle keeps
    /// its previous load.
    fn apply_occupancy(&mut self, id: &str, load: Occupancy) -> Result<()> {
        let vehicle = self
            .fleet
            .get_mut(id)
            .ok_or_else(|| anyhow!("vehicle {id} is no longer in the fleet"))?;
        let mut updated = vehicle.clone();
        if let Some(count) = load.passengers {
            updated.set_current_passengers(count)?;
        }
        if let Some(weight) = load.cargo {
            updated.set_current_cargo(weight)?;
        }
        *vehicle = updated;
        Ok(())
    }

    fn run_demo(&mut self) -> Result<()> {
        let demo = [
            Vehicle::car("C001", "Toyota Camry", 220.0)?,
            Vehicle::truck("T001", "Volvo FH16", 140.0)?,
            Vehicle::airplane("A001", "Boeing 747", 900.0, 41_000.0)?,
            Vehicle::car("C002", "Toyota Camry", 220.0)?,
        ];
        if let Some(taken) = demo.iter().find(|vehicle| self.fleet.get(vehicle.id()).is_some()) {
            bail!("demo vehicle {} is already in the fleet", taken.id());
        }
        for vehicle in demo {
            self.fleet.add(vehicle)?;
        }
        let refuel = self.fleet.refuel_all(1_000.0);
        let journeys = self.fleet.start_all_journeys(100.0);
        let path = self.config.data_file.with_file_name(DEMO_FILE);
        self.fleet.save_to_file(&path)?;
        info!(path = %path.display(), "demo fleet written");
        self.state.set_status(format!(
            "Demo: {}; {}; saved to {}",
            refuel.summary("Refuel"),
            journeys.summary("Journeys"),
            path.display()
        ));
        Ok(())
    }

    fn remove_selected(&mut self) -> Result<()> {
        let id = self
            .selected()
            .map(|vehicle| vehicle.id().to_string())
            .ok_or_else(|| anyhow!("no vehicle selected"))?;
        let removed = self.fleet.remove(&id)?;
        self.state.set_status(format!("Removed {removed}"));
        let len = self.visible_len();
        self.state.clamp_cursor(len);
        Ok(())
    }

    fn save_fleet(&mut self) -> Result<()> {
        let path = self.config.data_file.clone();
        self.fleet.save_to_file(&path)?;
        self.state.set_status(format!(
            "Saved {} vehicle(s) to {}",
            self.fleet.len(),
            path.display()
        ));
        Ok(())
    }

    fn load_fleet(&mut self) {
        let path = self.config.data_file.clone();
        match self.fleet.load_from_file(&path) {
            Ok(outcome) => {
                info!(path = %path.display(), %outcome, "load requested");
                self.state
                    .set_status(format!("{}: {outcome}", path.display()));
            }
            Err(err) => {
                error!(?err, "fleet load failed");
                self.state.set_status(format!("Load failed: {err:#}"));
            }
        }
        self.state.cursor = 0;
        self.state.offset = 0;
    }

    fn set_view(&mut self, view: View) {
        self.state.view = view;
        self.state.cursor = 0;
        self.state.offset = 0;
    }

    fn visible(&self) -> Vec<&Vehicle> {
        match &self.state.view {
            View::All => self.fleet.iter().collect(),
            View::Type(name) => self.fleet.search(name),
            View::NeedingMaintenance => self.fleet.vehicles_needing_maintenance(),
        }
    }

    fn visible_len(&self) -> usize {
        self.visible().len()
    }

    fn selected(&self) -> Option<&Vehicle> {
        self.visible().get(self.state.cursor).copied()
    }

    fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4)])
            .split(frame.size());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        self.render_vehicle_list(frame, columns[0]);
        match self.state.pane {
            Pane::Detail => self.render_detail(frame, columns[1]),
            Pane::Report => self.render_report(frame, columns[1]),
        }
        self.render_status(frame, rows[1]);

        if let Some(prompt) = &self.prompt {
            self.render_prompt(frame, prompt);
        }
    }

    fn render_vehicle_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        let len = self.visible_len();
        self.state.clamp_cursor(len);
        self.state.ensure_cursor_visible(len);

        let vehicles = self.visible();
        let end = (self.state.offset + self.state.list_height).min(vehicles.len());
        let page = &vehicles[self.state.offset.min(end)..end];

        let mut list_state = ListState::default();
        if !page.is_empty() {
            list_state.select(Some(self.state.cursor - self.state.offset));
        }
        let items: Vec<ListItem> = page
            .iter()
            .enumerate()
            .map(|(idx, vehicle)| {
                let is_selected = self.state.cursor == self.state.offset + idx;
                let marker = if is_selected {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                let mut line = vec![
                    marker,
                    Span::styled(
                        format!("{:<10}", vehicle.id()),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:<10}", vehicle.type_name()),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::raw(vehicle.model().to_string()),
                ];
                if vehicle.needs_maintenance() {
                    line.push(Span::styled(
                        "  [service due]",
                        Style::default().fg(self.theme.warning),
                    ));
                }
                ListItem::new(Line::from(line))
            })
            .collect();

        let title = format!("{} ({})", self.state.view.title(), vehicles.len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let Some(vehicle) = self.selected() else {
            let paragraph = Paragraph::new("No vehicle selected. Press 'a' to add one.")
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        };

        let label = Style::default().fg(self.theme.muted);
        let row = |name: &str, value: String| {
            Line::from(vec![Span::styled(format!("{name:<18}"), label), Span::raw(value)])
        };
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} {}", vehicle.type_name(), vehicle.id()),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            row("Model", vehicle.model().to_string()),
            row("Family", vehicle.family().label().to_string()),
            row("Max speed", format!("{} km/h", vehicle.max_speed())),
            row("Mileage", format!("{:.1} km", vehicle.current_mileage())),
            row(
                "Efficiency",
                format!("{:.2} km/l", vehicle.fuel_efficiency()),
            ),
            row("Capabilities", vehicle.capabilities().to_string()),
        ];
        if let Some(wheels) = vehicle.wheels() {
            lines.push(row("Wheels", wheels.to_string()));
        }
        if let Some(altitude) = vehicle.max_altitude() {
            lines.push(row("Max altitude", format!("{altitude} ft")));
        }
        if vehicle.has_sail() {
            lines.push(row("Propulsion", "sail".to_string()));
        }
        if let Some(level) = vehicle.fuel_level() {
            lines.push(row("Fuel", format!("{level:.1} L")));
        }
        if let (Some(current), Some(capacity)) =
            (vehicle.current_passengers(), vehicle.passenger_capacity())
        {
            lines.push(row("Passengers", format!("{current} / {capacity}")));
        }
        if let (Some(current), Some(capacity)) =
            (vehicle.current_cargo(), vehicle.cargo_capacity())
        {
            lines.push(row("Cargo", format!("{current:.1} / {capacity:.1} kg")));
        }
        if let Some(baseline) = vehicle.mileage_at_last_service() {
            lines.push(row("Last service", format!("{baseline:.1} km")));
            let (text, color) = if vehicle.needs_maintenance() {
                ("due", self.theme.warning)
            } else {
                ("ok", self.theme.success)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<18}", "Maintenance"), label),
                Span::styled(text, Style::default().fg(color)),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(row(
            "100 km takes",
            format!("{:.2} h", vehicle.estimate_journey_time(100.0)),
        ));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_report(&self, frame: &mut Frame, area: Rect) {
        let text = self.fleet.generate_report();
        let lines: Vec<Line> = text.lines().map(|line| Line::from(line.to_string())).collect();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Report"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = Line::from(Span::styled(
            "a add  p load  x remove  d demo  g journeys  f refuel  m maintain  r report  / search  \
             n due  1/2/3 sort  s save  l load  q quit",
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![Line::from(self.state.status.clone()), help])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_prompt(&self, frame: &mut Frame, prompt: &PromptModal) {
        let frame_area = frame.size();
        let width = cmp::max(cmp::min(64_u16, frame_area.width.saturating_sub(4)), 24_u16);
        let height = 6_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let x = frame_area.x + (frame_area.width.saturating_sub(width)) / 2;
        let y = frame_area.y + (frame_area.height.saturating_sub(height)) / 2;
        let area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, area);

        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(prompt.input.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" confirm  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);
        let paragraph = Paragraph::new(vec![
            Line::from(prompt.kind.instruction()),
            input_line,
            Line::from(""),
            helper,
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(prompt.kind.title()),
        );
        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + prompt.cursor as u16).min(area.x + area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, area.y + 2);
    }
}

/// Build a vehicle from the add form: `Type,id,model,max_speed` followed by
/// the service ceiling for airplanes or an optional sail flag for ships.
fn parse_vehicle_form(input: &str) -> Result<Vehicle> {
    let fields: Vec<&str> = input.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        bail!("expected Type,id,model,max_speed");
    }
    let vehicle_type: VehicleType = fields[0].parse()?;
    let (id, model) = (fields[1], fields[2]);
    let max_speed: f64 = fields[3]
        .parse()
        .with_context(|| format!("invalid max speed '{}'", fields[3]))?;
    let extra = &fields[4..];

    let vehicle = match (vehicle_type, extra) {
        (VehicleType::Car, []) => Vehicle::car(id, model, max_speed)?,
        (VehicleType::Truck, []) => Vehicle::truck(id, model, max_speed)?,
        (VehicleType::Bus, []) => Vehicle::bus(id, model, max_speed)?,
        (VehicleType::Airplane, [altitude]) => {
            let altitude: f64 = altitude
                .parse()
                .with_context(|| format!("invalid altitude '{altitude}'"))?;
            Vehicle::airplane(id, model, max_speed, altitude)?
        }
        (VehicleType::Airplane, _) => bail!("airplanes need exactly one altitude field"),
        (VehicleType::CargoShip, []) => Vehicle::cargo_ship(id, model, max_speed, false)?,
        (VehicleType::CargoShip, [sail]) => {
            let has_sail = match sail.to_ascii_lowercase().as_str() {
                "true" | "sail" | "yes" => true,
                "false" | "no" => false,
                other => bail!("invalid sail flag '{other}'"),
            };
            Vehicle::cargo_ship(id, model, max_speed, has_sail)?
        }
        (other, _) => bail!("unexpected extra fields for {other}"),
    };
    Ok(vehicle)
}

/// Parse a positive amount, falling back to `default` when the input is empty.
fn parse_amount(input: &str, default: f64) -> Result<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }
    let value: f64 = input
        .parse()
        .with_context(|| format!("'{input}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        bail!("amount must be positive");
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Occupancy {
    passengers: Option<u32>,
    cargo: Option<f64>,
}

/// Parse the passengers/cargo prompt. Only the fields the vehicle supports are
/// accepted, in that order; a blank field leaves the current value alone.
fn parse_occupancy(input: &str, passengers: bool, cargo: bool) -> Result<Occupancy> {
    let fields: Vec<&str> = if input.trim().is_empty() {
        Vec::new()
    } else {
        input.split(',').map(str::trim).collect()
    };
    let expected = usize::from(passengers) + usize::from(cargo);
    if fields.len() > expected {
        bail!("expected at most {expected} field(s)");
    }

    let mut fields = fields.into_iter();
    let mut load = Occupancy::default();
    if passengers {
        if let Some(raw) = fields.next().filter(|raw| !raw.is_empty()) {
            let count = raw
                .parse::<u32>()
                .with_context(|| format!("invalid passenger count '{raw}'"))?;
            load.passengers = Some(count);
        }
    }
    if cargo {
        if let Some(raw) = fields.next().filter(|raw| !raw.is_empty()) {
            let weight = raw
                .parse::<f64>()
                .ok()
                .filter(|weight| weight.is_finite())
                .ok_or_else(|| anyhow!("invalid cargo weight '{raw}'"))?;
            load.cargo = Some(weight);
        }
    }
    Ok(load)
}

/// Leave raw mode and the alternate screen, attempting every step even when an
/// earlier one fails.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    let raw_mode = disable_raw_mode().context("failed to disable raw mode");
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen");
    terminal.show_cursor().context("failed to show cursor")?;
    raw_mode.and(screen)
}

/// Forward terminal input to the UI task, with a tick whenever the terminal
/// stays idle for [`TICK_RATE`]. Stops once the receiver is dropped.
fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while !sender.is_closed() {
            let next = match event::poll(TICK_RATE) {
                Ok(true) => event::read().map(AppEvent::Input),
                Ok(false) => Ok(AppEvent::Tick),
                Err(err) => Err(err),
            };
            let app_event = match next {
                Ok(app_event) => app_event,
                Err(err) => {
                    error!(?err, "terminal input failed");
                    break;
                }
            };
            if sender.blocking_send(app_event).is_err() {
                break;
            }
        }
    });
}

struct UiState {
    cursor: usize,
    offset: usize,
    list_height: usize,
    status: String,
    pane: Pane,
    view: View,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            offset: 0,
            list_height: 1,
            status: "Ready".to_string(),
            pane: Pane::Detail,
            view: View::All,
            should_quit: false,
        }
    }
}

impl UiState {
    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let idx = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = idx as usize;
        self.ensure_cursor_visible(len);
    }

    fn set_status(&mut self, message: String) {
        self.status = format!("[{}] {message}", Local::now().format("%H:%M:%S"));
    }

    fn clamp_cursor(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn ensure_cursor_visible(&mut self, len: usize) {
        if len == 0 || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
        self.offset = self.offset.min(len.saturating_sub(height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::Family;
    use tempfile::tempdir;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut FleetApp, text: &str) {
        for ch in text.chars() {
            app.handle_input(press(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn form_builds_each_type() -> Result<()> {
        let car = parse_vehicle_form("Car, C1, Toyota, 220")?;
        assert_eq!(car.vehicle_type(), VehicleType::Car);
        assert_eq!(car.model(), "Toyota");

        let plane = parse_vehicle_form("airplane,A1,Boeing 747,900,41000")?;
        assert_eq!(plane.max_altitude(), Some(41_000.0));

        let ship = parse_vehicle_form("CargoShip,S1,Clipper,30,sail")?;
        assert_eq!(ship.family(), Family::Water { has_sail: true });

        let motor_ship = parse_vehicle_form("CargoShip,S2,Ever Given,40")?;
        assert!(!motor_ship.has_sail());
        Ok(())
    }

    #[test]
    fn occupancy_form_follows_capabilities() -> Result<()> {
        let both = parse_occupancy("12, 250.5", true, true)?;
        assert_eq!(both.passengers, Some(12));
        assert_eq!(both.cargo, Some(250.5));

        let cargo_only = parse_occupancy(",300", true, true)?;
        assert_eq!(cargo_only, Occupancy { passengers: None, cargo: Some(300.0) });

        let truck = parse_occupancy("4000", false, true)?;
        assert_eq!(truck.cargo, Some(4_000.0));
        assert_eq!(parse_occupancy("  ", true, false)?, Occupancy::default());
        Ok(())
    }

    #[test]
    fn occupancy_form_rejects_bad_input() {
        assert!(parse_occupancy("3,100", true, false).is_err());
        assert!(parse_occupancy("-1", true, false).is_err());
        assert!(parse_occupancy("many", true, true).is_err());
        assert!(parse_occupancy("2,heavy", true, true).is_err());
        assert!(parse_occupancy("2,NaN", true, true).is_err());
    }

    #[test]
    fn form_rejects_bad_input() {
        assert!(parse_vehicle_form("Car,C1,Toyota").is_err());
        assert!(parse_vehicle_form("Boat,B1,Dinghy,10").is_err());
        assert!(parse_vehicle_form("Car,C1,Toyota,fast").is_err());
        assert!(parse_vehicle_form("Car,C1,Toyota,220,4").is_err());
        assert!(parse_vehicle_form("Airplane,A1,Boeing,900").is_err());
        assert!(parse_vehicle_form("CargoShip,S1,Clipper,30,maybe").is_err());
        assert!(parse_vehicle_form("Car,,Toyota,220").is_err());
    }

    #[test]
    fn amount_defaults_and_validation() -> Result<()> {
        assert_eq!(parse_amount("", 100.0)?, 100.0);
        assert_eq!(parse_amount(" 42.5 ", 100.0)?, 42.5);
        assert!(parse_amount("0", 100.0).is_err());
        assert!(parse_amount("-3", 100.0).is_err());
        assert!(parse_amount("far", 100.0).is_err());
        Ok(())
    }

    #[test]
    fn prompt_editing() {
        let mut prompt = PromptModal::new(PromptKind::SearchType, "Cr".to_string());
        prompt.move_cursor(-1);
        prompt.insert('a');
        assert_eq!(prompt.input, "Car");
        prompt.backspace();
        prompt.delete();
        assert_eq!(prompt.input, "C");
        prompt.move_cursor(10);
        assert_eq!(prompt.cursor, 1);
    }

    #[test]
    fn keyboard_session_adds_moves_and_saves() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig {
            data_file: dir.path().join("fleet.csv"),
            ..AppConfig::default()
        };
        let mut app = FleetApp::new(config.clone());

        app.handle_input(press(KeyCode::Char('a')));
        type_text(&mut app, "Car,C1,Toyota,220");
        app.handle_input(press(KeyCode::Enter));
        assert_eq!(app.fleet.len(), 1);
        // follow-up prompt for the initial load
        type_text(&mut app, "3");
        app.handle_input(press(KeyCode::Enter));
        assert!(app.prompt.is_none());
        assert_eq!(app.fleet.get("C1").and_then(Vehicle::current_passengers), Some(3));

        app.handle_input(press(KeyCode::Char('a')));
        type_text(&mut app, "Car,c1,Honda,180");
        app.handle_input(press(KeyCode::Enter));
        assert_eq!(app.fleet.len(), 1);
        assert!(app.state.status.contains("Error"));

        app.handle_input(press(KeyCode::Char('f')));
        app.handle_input(press(KeyCode::Enter));
        app.handle_input(press(KeyCode::Char('g')));
        app.handle_input(press(KeyCode::Enter));
        assert_eq!(
            app.fleet.get("C1").map(Vehicle::current_mileage),
            Some(config.default_distance)
        );

        app.handle_input(press(KeyCode::Char('s')));
        let mut restored = Fleet::new();
        restored.load_from_file(&config.data_file)?;
        assert_eq!(restored.vehicles(), app.fleet.vehicles());

        app.handle_input(press(KeyCode::Char('x')));
        assert!(app.fleet.is_empty());
        app.handle_input(press(KeyCode::Char('q')));
        assert!(app.state.should_quit);
        Ok(())
    }

    #[test]
    fn search_narrows_the_list() {
        let mut app = FleetApp::new(AppConfig::default());
        for form in ["Car,C1,Toyota,220", "Bus,B1,Setra,110", "Car,C2,Honda,180"] {
            app.open_prompt(PromptKind::AddVehicle, form.to_string());
            app.handle_input(press(KeyCode::Enter));
            app.handle_input(press(KeyCode::Esc));
        }
        app.handle_input(press(KeyCode::Char('/')));
        type_text(&mut app, "car");
        app.handle_input(press(KeyCode::Enter));
        assert_eq!(app.visible_len(), 2);

        app.handle_input(press(KeyCode::Char('j')));
        assert_eq!(app.selected().map(Vehicle::id), Some("C2"));

        app.handle_input(press(KeyCode::Esc));
        assert_eq!(app.visible_len(), 3);
    }

    #[test]
    fn overloaded_truck_keeps_previous_load() {
        let mut app = FleetApp::new(AppConfig::default());
        app.open_prompt(PromptKind::AddVehicle, "Truck,T1,Volvo,140".to_string());
        app.handle_input(press(KeyCode::Enter));
        type_text(&mut app, "3000");
        app.handle_input(press(KeyCode::Enter));
        let truck = app.fleet.get("T1").unwrap();
        assert_eq!(truck.current_cargo(), Some(3_000.0));
        assert!((truck.fuel_efficiency() - 7.2).abs() < 1e-12);

        app.handle_input(press(KeyCode::Char('p')));
        type_text(&mut app, "6000");
        app.handle_input(press(KeyCode::Enter));
        assert!(app.state.status.contains("overload"));
        assert_eq!(app.fleet.get("T1").and_then(Vehicle::current_cargo), Some(3_000.0));
    }

    #[test]
    fn bus_load_is_applied_atomically() {
        let mut app = FleetApp::new(AppConfig::default());
        app.open_prompt(PromptKind::AddVehicle, "Bus,B1,Setra,110".to_string());
        app.handle_input(press(KeyCode::Enter));
        type_text(&mut app, "20,900");
        app.handle_input(press(KeyCode::Enter));

        let bus = app.fleet.get("B1").unwrap();
        assert_eq!(bus.current_passengers(), Some(0));
        assert_eq!(bus.current_cargo(), Some(0.0));
    }

    #[test]
    fn demo_populates_and_saves() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig {
            data_file: dir.path().join("fleet.csv"),
            ..AppConfig::default()
        };
        let mut app = FleetApp::new(config);
        app.handle_input(press(KeyCode::Char('d')));
        assert_eq!(app.fleet.len(), 4);
        assert_eq!(app.fleet.report().total_mileage, 400.0);

        let mut saved = Fleet::new();
        saved.load_from_file(dir.path().join(DEMO_FILE))?;
        assert_eq!(saved.vehicles(), app.fleet.vehicles());

        app.handle_input(press(KeyCode::Char('d')));
        assert_eq!(app.fleet.len(), 4);
        assert!(app.state.status.contains("already in the fleet"));
        Ok(())
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut state = UiState {
            list_height: 2,
            ..UiState::default()
        };
        state.move_cursor(5, 4);
        assert_eq!(state.cursor, 3);
        assert_eq!(state.offset, 2);
        state.move_cursor(-10, 4);
        assert_eq!((state.cursor, state.offset), (0, 0));
        state.clamp_cursor(0);
        assert_eq!(state.cursor, 0);
    }
}
