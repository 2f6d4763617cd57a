#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::analyzer::*;
    use crate::board::{Board, PlayerId, Settings};
    use crate::difficulty::Difficulty;
    use crate::engine::{Engine, MoveRequest, Player};
    use crate::evaluation::evaluate;
    use crate::move_ordering::order_moves;
    use crate::search::{Searcher, INFINITY, WIN_SCORE};

    fn players(difficulty: Difficulty) -> Vec<Player> {
        vec![Player::ai(1, "Red", difficulty), Player::ai(2, "Yellow", difficulty)]
    }

    fn request(
        board: &Board,
        settings: Settings,
        current: usize,
        difficulty: Difficulty,
    ) -> MoveRequest {
        MoveRequest::new(board.clone(), settings, players(difficulty), current, difficulty)
    }

    /// Drops `pieces` random discs with gravity, alternating players 1 and 2
    fn random_board(rng: &mut StdRng, settings: &Settings, pieces: usize) -> Board {
        let mut board = Board::for_settings(settings);
        for turn in 0..pieces {
            let moves = valid_moves(&board);
            if moves.is_empty() {
                break;
            }
            let column = moves[rng.gen_range(0..moves.len())];
            board.drop_piece(column, (turn % 2 + 1) as PlayerId);
        }
        board
    }

    /// Random board that is not yet decided
    fn random_open_board(rng: &mut StdRng, settings: &Settings, pieces: usize) -> Result<Board> {
        for _ in 0..1000 {
            let board = random_board(rng, settings, pieces);
            if terminal_state(&board, settings) == Terminal::Ongoing {
                return Ok(board);
            }
        }
        Err(anyhow!("no open position with {} pieces found", pieces))
    }

    /// Independent win check: is any `win_length` window through (row, col) uniform?
    fn brute_force_win(board: &Board, settings: &Settings, row: usize, col: usize) -> bool {
        let owner = match board.get(row, col) {
            Some(owner) => owner,
            None => return false,
        };
        let length = settings.win_length as isize;
        active_directions(settings).iter().any(|&(dr, dc)| {
            (0..length).any(|shift| {
                (0..length).all(|i| {
                    let r = row as isize + dr * (i - shift);
                    let c = col as isize + dc * (i - shift);
                    board.get_signed(r, c) == Some(Some(owner))
                })
            })
        })
    }

    /// Plain minimax with the same leaf rules as the searcher, no pruning
    fn full_minimax(
        board: &mut Board,
        settings: &Settings,
        order: &[PlayerId],
        searching: usize,
        depth: usize,
        mover: usize,
        last: Option<(usize, usize)>,
    ) -> i32 {
        let terminal = match last {
            Some((row, col)) => terminal_after_move(board, row, col, settings),
            None => terminal_state(board, settings),
        };
        match terminal {
            Terminal::Win(winner) if winner == order[searching] => return WIN_SCORE + depth as i32,
            Terminal::Win(_) => return -WIN_SCORE - depth as i32,
            Terminal::Draw => return 0,
            Terminal::Ongoing if depth == 0 => return evaluate(board, settings, order[searching]),
            Terminal::Ongoing => {}
        }

        let child = (mover + 1) % order.len();
        let scores = valid_moves(board).into_iter().map(|col| {
            let row = board.drop_piece(col, order[mover]).expect("valid move");
            let last = Some((row, col));
            let score = full_minimax(board, settings, order, searching, depth - 1, child, last);
            board.clear(row, col);
            score
        });
        let scores: Vec<i32> = scores.collect();
        if mover == searching {
            scores.into_iter().max().unwrap_or(0)
        } else {
            scores.into_iter().min().unwrap_or(0)
        }
    }

    #[test]
    pub fn valid_moves_are_open_columns_in_order() {
        let settings = Settings::new(5, 6, 4, true);
        let mut rng = StdRng::seed_from_u64(11);
        for pieces in 0..=settings.total_cells() {
            let board = random_board(&mut rng, &settings, pieces);
            let expected: Vec<usize> = (0..settings.cols)
                .filter(|&c| board.get(0, c).is_none())
                .collect();
            assert_eq!(valid_moves(&board), expected);
        }
    }

    #[test]
    pub fn wins_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(5);
        for &settings in &[
            Settings::new(6, 7, 4, true),
            Settings::new(6, 7, 4, false),
            Settings::new(4, 4, 3, true),
            Settings::new(5, 8, 5, true),
        ] {
            for pieces in (0..=settings.total_cells()).step_by(3) {
                let board = random_board(&mut rng, &settings, pieces);
                for row in 0..settings.rows {
                    for col in 0..settings.cols {
                        let found = check_win_at(&board, row, col, &settings);
                        assert_eq!(found.is_some(), brute_force_win(&board, &settings, row, col));

                        if let Some(line) = found {
                            assert_eq!(line.cells.len(), settings.win_length);
                            assert!(line.cells.contains(&(row, col)));
                            let owner = Some(line.player);
                            assert!(line.cells.iter().all(|&(r, c)| board.get(r, c) == owner));
                        }
                    }
                }
            }
        }
    }

    #[test]
    pub fn diagonals_only_count_when_enabled() -> Result<()> {
        let board = Board::from_rows(&[
            [0, 0, 0, 1, 0, 0, 0],
            [0, 0, 1, 2, 0, 0, 0],
            [0, 1, 2, 2, 0, 0, 0],
            [1, 2, 1, 2, 0, 0, 0],
            [1, 1, 2, 1, 0, 0, 0],
            [1, 2, 1, 2, 0, 0, 0],
        ])?;
        let with = Settings::new(6, 7, 4, true);
        let without = Settings::new(6, 7, 4, false);

        assert_eq!(check_win_at(&board, 0, 3, &with).map(|line| line.player), Some(1));
        for (row, col, _) in board.occupied() {
            assert_eq!(check_win_at(&board, row, col, &without), None);
        }
        assert_eq!(terminal_state(&board, &with), Terminal::Win(1));
        assert_eq!(terminal_state(&board, &without), Terminal::Ongoing);
        Ok(())
    }

    #[test]
    pub fn draw_iff_full_without_a_win() {
        let mut rng = StdRng::seed_from_u64(17);
        let settings = Settings::new(4, 5, 4, true);
        for pieces in [settings.total_cells(); 200].iter().chain([12, 15, 19].iter()) {
            let board = random_board(&mut rng, &settings, *pieces);
            let any_win = board
                .occupied()
                .any(|(row, col, _)| brute_force_win(&board, &settings, row, col));
            let state = terminal_state(&board, &settings);

            assert_eq!(state == Terminal::Draw, board.is_full() && !any_win);
            assert_eq!(matches!(state, Terminal::Win(_)), any_win);
        }
    }

    #[test]
    pub fn search_restores_the_board() -> Result<()> {
        let settings = Settings::default();
        let mut rng = StdRng::seed_from_u64(23);
        let order = [1, 2];
        for pieces in [0, 5, 12, 25] {
            let board = random_open_board(&mut rng, &settings, pieces)?;
            let mut searcher = Searcher::new(&board, settings, &order, pieces % 2);
            searcher.best_move(4);
            assert_eq!(searcher.board(), &board);

            let mut scratch = board.clone();
            let moves = valid_moves(&scratch);
            order_moves(&mut scratch, &settings, &moves, 1, Some(3));
            find_fork(&mut scratch, &moves, 2, &settings);
            assert_eq!(scratch, board);
        }
        Ok(())
    }

    #[test]
    pub fn alpha_beta_matches_full_minimax() -> Result<()> {
        let settings = Settings::new(4, 4, 3, true);
        let order = [1, 2];
        let mut rng = StdRng::seed_from_u64(31);

        for pieces in [2, 4, 6, 8, 9] {
            for _ in 0..5 {
                let board = random_open_board(&mut rng, &settings, pieces)?;
                let depth = board.empty_cells().min(7);
                for searching in 0..2 {
                    let mut scratch = board.clone();
                    let expected = full_minimax(
                        &mut scratch,
                        &settings,
                        &order,
                        searching,
                        depth,
                        searching,
                        None,
                    );

                    let mut searcher = Searcher::new(&board, settings, &order, searching);
                    let pruned =
                        searcher.minimax(depth, true, -INFINITY, INFINITY, searching, None);
                    assert_eq!(pruned, expected, "position {:?}, depth {}", board, depth);
                    assert_eq!(searcher.board(), &board);
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn very_easy_is_uniform() {
        let settings = Settings::default();
        let board = Board::for_settings(&settings);
        let mut engine = Engine::with_seed(2024);
        let request = request(&board, settings, 0, Difficulty::VeryEasy);

        let trials = 7000;
        let mut counts = [0usize; 7];
        for _ in 0..trials {
            let column = engine.choose_move(&request).expect("open board");
            counts[column] += 1;
        }
        // expected 1000 each, standard deviation about 30
        for &count in counts.iter() {
            assert!((850..=1150).contains(&count), "{:?}", counts);
        }
    }

    #[test]
    pub fn open_three_is_completed_or_blocked() -> Result<()> {
        let settings = Settings::new(6, 7, 4, true);
        let board = Board::from_rows(&[
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 2, 2, 0, 0, 0],
            [0, 0, 1, 1, 1, 0, 0],
        ])?;

        for &difficulty in &Difficulty::all()[1..] {
            for current in 0..2 {
                let mut engine = Engine::with_seed(1).without_noise();
                let column = engine.choose_move(&request(&board, settings, current, difficulty));
                assert!(
                    column == Some(1) || column == Some(5),
                    "{} as player {} chose {:?}",
                    difficulty,
                    current + 1,
                    column
                );
            }
        }
        Ok(())
    }

    /// One empty cell left and no line can be completed
    fn nearly_full() -> Result<(Board, Settings)> {
        let board = Board::from_rows(&[[0, 2, 1, 2], [1, 1, 2, 2], [2, 2, 1, 1], [1, 1, 2, 2]])?;
        Ok((board, Settings::new(4, 4, 4, true)))
    }

    #[test]
    pub fn single_legal_column_is_always_chosen() -> Result<()> {
        let (board, settings) = nearly_full()?;
        assert_eq!(terminal_state(&board, &settings), Terminal::Ongoing);
        for &difficulty in Difficulty::all() {
            for current in 0..2 {
                let mut engine = Engine::with_seed(8);
                let request = request(&board, settings, current, difficulty);
                assert_eq!(engine.choose_move(&request), Some(0));
                assert_eq!(engine.fallback_move(&request), Some(0));
            }
        }
        Ok(())
    }

    #[test]
    pub fn full_board_has_no_move() -> Result<()> {
        let (mut board, settings) = nearly_full()?;
        board.drop_piece(0, 2);
        assert_eq!(terminal_state(&board, &settings), Terminal::Draw);
        for &difficulty in Difficulty::all() {
            let mut engine = Engine::with_seed(8);
            let request = request(&board, settings, 0, difficulty);
            assert_eq!(engine.choose_move(&request), None);
            assert_eq!(engine.fallback_move(&request), None);
            assert_eq!(engine.hint(&request), None);
        }
        Ok(())
    }

    #[test]
    pub fn deep_tiers_are_deterministic() -> Result<()> {
        let settings = Settings::default();
        let mut rng = StdRng::seed_from_u64(99);
        for pieces in [1, 6, 14] {
            let board = random_open_board(&mut rng, &settings, pieces)?;
            for &difficulty in &[Difficulty::Hard, Difficulty::VeryHard] {
                let request = request(&board, settings, pieces % 2, difficulty);
                let first = Engine::with_seed(1).without_noise().choose_move(&request);
                let second = Engine::with_seed(2).without_noise().choose_move(&request);
                assert!(first.is_some());
                assert_eq!(first, second);
            }
        }
        Ok(())
    }

    #[test]
    pub fn medium_blocks_an_opponent_fork() -> Result<()> {
        let settings = Settings::new(6, 7, 4, false);
        let board = Board::from_rows(&[
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 1, 0, 1, 0, 0],
            [0, 0, 2, 0, 2, 0, 0],
        ])?;
        let mut engine = Engine::with_seed(4).without_noise();
        assert_eq!(engine.choose_move(&request(&board, settings, 0, Difficulty::Medium)), Some(3));
        Ok(())
    }

    #[test]
    pub fn very_hard_creates_a_fork() -> Result<()> {
        let settings = Settings::new(6, 7, 4, false);
        let board = Board::from_rows(&[
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 2],
            [0, 0, 0, 0, 0, 0, 1],
            [0, 0, 1, 0, 1, 0, 2],
            [0, 0, 2, 0, 2, 0, 1],
        ])?;
        let mut engine = Engine::with_seed(4);
        let column = engine.choose_move(&request(&board, settings, 1, Difficulty::VeryHard));
        assert_eq!(column, Some(3));
        Ok(())
    }

    #[test]
    pub fn deep_search_avoids_a_losing_reply() -> Result<()> {
        // player 1 threatens an open three in column 3
        let settings = Settings::new(6, 7, 4, false);
        let board = Board::from_rows(&[
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 1, 0, 1, 0, 2],
        ])?;
        let order = [1, 2];
        let mut searcher = Searcher::new(&board, settings, &order, 1);
        let result = searcher.best_move(4).expect("open board");
        assert!([1, 3, 5].contains(&result.column), "{:?}", result);
        assert!(result.score > -WIN_SCORE);
        Ok(())
    }
}
