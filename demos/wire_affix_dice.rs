/// Wire Affix Dice — links a small skill tree to its dice in a scratch project.
///
/// Run: cargo run --example wire_affix_dice
use resource_linker::{Linker, LinkerConfig};
use std::fs;

const FIRE_D6: &str = r#"[gd_resource type="Resource" script_class="DieResource" load_steps=2 format=3 uid="uid://c8fire6die"]

[ext_resource type="Script" path="res://scripts/dice/die_resource.gd" id="1_dscr"]

[resource]
script = ExtResource("1_dscr")
die_size = "d6"
element = "fire"
"#;

const TREE: &str = r#"[gd_resource type="Resource" script_class="SkillTree" load_steps=4 format=3]

[ext_resource type="Script" path="res://scripts/dice/die_resource.gd" id="1_dscr"]
[ext_resource type="Script" path="res://scripts/affixes/affix.gd" id="2_affx"]

[sub_resource type="Resource" id="Resource_grant"]
script = ExtResource("2_affx")
category = 3
affix_name = "Grant Fire D6"

[resource]
script = ExtResource("2_affx")
tree_name = "Ember Path"
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let project = tempfile::tempdir()?;
    let dice_dir = project.path().join("resources/dice/affix_dice");
    let tree_path = project.path().join("ember_path.tres");
    fs::create_dir_all(&dice_dir)?;
    fs::write(dice_dir.join("d6_fire.tres"), FIRE_D6)?;
    fs::write(&tree_path, TREE)?;

    let linker = Linker::builder()
        .config(LinkerConfig::default())
        .targets_dir(&dice_dir)
        .build()?;

    let first = linker.link_paths(&[tree_path.clone()]);
    println!("first run:  {}", first);
    println!("\n{}", fs::read_to_string(&tree_path)?);

    let second = linker.link_paths(&[tree_path]);
    println!("second run: {}", second);
    Ok(())
}
