//! Starting contents of the two editor panes

use crate::vm::{Network, ScriptVersion, VmConfig};

/// Initial text of both panes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub stack_elements: &'static str,
    pub witness_script: &'static str,
}

const BITCOIN: Preset = Preset {
    stack_elements: "// Stack elements are push-only
<2>
<3>
<'hello'>",
    witness_script: "// Witness script
OP_SHA256
<0x2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824>
OP_EQUALVERIFY
OP_ADD
<5>
OP_EQUAL",
};

const LIQUID: Preset = Preset {
    stack_elements: "// Stack elements are push-only
<'wiz'>
<'ard'>",
    witness_script: "// OP_CAT is enabled on Liquid
OP_CAT
<'wizard'>
OP_EQUAL",
};

const LIQUID_TAPSCRIPT: Preset = Preset {
    stack_elements: "// 64-bit little-endian amounts
<0x0500000000000000>
<0x0300000000000000>",
    witness_script: "OP_ADD64
OP_VERIFY
<0x0800000000000000>
OP_EQUAL",
};

pub fn preset_for(config: VmConfig) -> Preset {
    match (config.network, config.version) {
        (Network::Bitcoin, _) => BITCOIN,
        (Network::Liquid, ScriptVersion::Segwit) => LIQUID,
        (Network::Liquid, ScriptVersion::Tapscript) => LIQUID_TAPSCRIPT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{evaluate, lines::editor_lines};
    use crate::vm::ScriptMachine;

    #[test]
    fn test_presets_evaluate_to_true() {
        let configs = [
            VmConfig::new(Network::Bitcoin, ScriptVersion::Segwit),
            VmConfig::new(Network::Bitcoin, ScriptVersion::Tapscript),
            VmConfig::new(Network::Liquid, ScriptVersion::Segwit),
            VmConfig::new(Network::Liquid, ScriptVersion::Tapscript),
        ];

        for config in configs {
            let preset = preset_for(config);
            let mut vm = ScriptMachine::new(config);
            let eval = evaluate(
                &mut vm,
                &editor_lines(preset.stack_elements),
                &editor_lines(preset.witness_script),
                None,
            );

            assert!(eval.failure.is_none(), "{}: {:?}", config, eval.failure);
            let last = eval.snapshots.last().unwrap().elements();
            assert_eq!(last.len(), 1, "{}", config);
            assert_eq!(last[0].display_value(), "1", "{}", config);
        }
    }
}
