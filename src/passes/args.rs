// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use smallvec::SmallVec;

/// Parameters of a single pass invocation, split into tokens.
#[derive(Default, Debug)]
pub struct ArgTokens<'a> {
    pub tokens: SmallVec<[&'a str; 4]>,
}

const NO_TOKEN: usize = usize::MAX;

/// Splits a pass parameter string on whitespace. Double quotes group a token and are removed,
/// an unterminated quote extends to the end of the string.
pub fn split_args(params: &str) -> ArgTokens {
    let mut out = ArgTokens::default();
    let mut token_start: usize = NO_TOKEN;
    let mut quoted = false;
    #[inline]
    fn finish_token<'a>(token_start: &mut usize, out: &mut ArgTokens<'a>, params: &'a str, ii: usize) {
        if *token_start != NO_TOKEN {
            out.tokens.push(&params[*token_start..ii]);
            *token_start = NO_TOKEN;
        }
    }

    for (ii, cc) in params.char_indices() {
        match cc {
            '"' if quoted => {
                // an empty quoted string is still a token
                if token_start == NO_TOKEN {
                    out.tokens.push("");
                } else {
                    finish_token(&mut token_start, &mut out, params, ii);
                }
                quoted = false;
            }
            '"' => {
                finish_token(&mut token_start, &mut out, params, ii);
                quoted = true;
            }
            ' ' | '\t' | '\n' if !quoted => finish_token(&mut token_start, &mut out, params, ii),
            _ => {
                if token_start == NO_TOKEN {
                    token_start = ii
                }
            }
        }
    }
    finish_token(&mut token_start, &mut out, params, params.len());
    out
}
